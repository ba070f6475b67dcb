//! The `rubrix init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create rubrix.toml
    if std::path::Path::new("rubrix.toml").exists() {
        println!("rubrix.toml already exists, skipping.");
    } else {
        std::fs::write("rubrix.toml", SAMPLE_CONFIG)?;
        println!("Created rubrix.toml");
    }

    // Create example batch file
    std::fs::create_dir_all("submissions")?;
    let example_path = std::path::Path::new("submissions/example.toml");
    if example_path.exists() {
        println!("submissions/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_BATCH)?;
        println!("Created submissions/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit rubrix.toml with your API keys");
    println!("  2. Run: rubrix batch --file submissions/example.toml --offline");
    println!("  3. Drop --offline once a backend is configured");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# rubrix configuration

deadline_secs = 30
backend_timeout_secs = 25
retrieval_top_k = 5
max_context_chars = 3000
max_tokens = 1500
temperature = 0.3
parallelism = 4
output_dir = "./rubrix-results"

[primary]
model = "gpt-4.1"
api_key = "${OPENAI_API_KEY}"

[secondary]
model = "gpt-4.1-mini"
api_key = "${OPENAI_API_KEY}"

# retrieval_url = "http://localhost:8900"
"#;

const EXAMPLE_BATCH: &str = r#"[batch]
name = "Example Batch"
description = "A small example batch to get started"
default_word_limit = 250

[[submissions]]
id = "example-001"
question = "Discuss the evolving role of the Finance Commission in fiscal federalism."
topic = "fiscal federalism"
answer = """
In India, the Finance Commission under Article 280 mediates the vertical
devolution of taxes between the Union and the states. However, the growing
share of cesses and surcharges shrinks the divisible pool, as the 15th
Finance Commission report of 2020 noted.

Furthermore, centrally sponsored schemes bypass the devolution formula
entirely, weakening state autonomy. In conclusion, a predictable and
transparent formula is the way forward.
"""

[[submissions]]
question = "Examine the significance of Article 21 of the Constitution."
answer = """
Article 21 guarantees the right to life and personal liberty. The Supreme
Court expanded its scope in the Maneka Gandhi case of 1978, and later
judgments read privacy and dignity into it. Therefore it anchors most
modern rights jurisprudence.
"""
word_limit = 150
"#;
