//! Prompt templates for extraction and schema inference

pub const CATALOG_AGENT_PROMPT: &str = r#"
You are a catalog aggregator agent for building materials.

You will:
1. Search supplier websites using the `web_search` tool.
2. Visit the websites using the `get_website_html` tool with the complete URL from the search results.
3. Parse the HTML to find product listings or catalog entries.
4. Extract structured product info like:
   - Product name
   - Description
   - Key specifications (e.g., size, strength, material, capacity)
   - Price (if available)

Return JSON output like:
[
  {
    "supplier": "Supplier Name",
    "url": "https://...",
    "products": [
      {
        "name": "XYZ Concrete Block",
        "description": "...",
        "specs": {"size": "...", "strength": "..."},
        "price": "Rs. ..."
      }
    ]
  }
]

Only use `web_search` and `get_website_html`. Do not hallucinate.
Return JSON output without any additional text, not even a markdown code fence.
"#;

const CATALOG_PROMPT: &str = r#"
You are a catalog data extractor.

Below are webpage text sections from supplier websites for the category "{category}".

Extract product data as a JSON list with structure:
[
  {
    "supplier": "Supplier Name (if available)",
    "url": "https://...",
    "products": [
      {
        "name": "...",
        "description": "...",
        "specs": {"key1": "...", "key2": "..."},
        "price": "..."
      }
    ]
  }
]

Only extract real product data. Do not invent values.

Page Sections:
{sections}
"#;

const SCHEMA_INFERENCE_PROMPT: &str = r#"
You are an expert in product catalog structuring.

Here is a list of product dictionaries under the category "{category}":
{products}

Your task is to:
1. Infer a common schema (list of normalized attributes).
2. Reformat the product list using this schema.
3. Return the output in pure JSON format like this:
{
  "category": "{category}",
  "schema": ["name", "size", "material", "price", "strength"],
  "products": [
    {
      "name": "...",
      "size": "...",
      ...
    }
  ]
}

Do not use any additional text, not even a markdown code fence. I only want the output in JSON format.
"#;

/// Prompt for the direct extraction pipeline
pub fn catalog_prompt(category: &str, sections: &str) -> String {
    CATALOG_PROMPT
        .replace("{category}", category)
        .replace("{sections}", sections)
}

/// Prompt asking the model to unify listings under one schema
pub fn schema_inference_prompt(category: &str, products_json: &str) -> String {
    SCHEMA_INFERENCE_PROMPT
        .replace("{category}", category)
        .replace("{products}", products_json)
}

/// First user message of the agentic strategy
pub fn agent_task(category: &str) -> String {
    format!("Find product details and specifications for: {}", category)
}
