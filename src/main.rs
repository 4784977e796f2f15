use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};

use upsc_answer_formatter::utils::logging;
use upsc_answer_formatter::{AnswerFlow, Config, LlmService, PageInput};

/// Usage: upsc_answer_formatter <page> [<page> ...]
///
/// Each argument is a path: image files are base64-encoded and sent through
/// vision extraction, `.txt` files are taken as pre-extracted OCR text.
/// Pages must be given in reading order.
#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let paths: Vec<String> = std::env::args().skip(1).collect();
    if paths.is_empty() {
        anyhow::bail!("usage: upsc_answer_formatter <page> [<page> ...]");
    }

    let mut inputs = Vec::with_capacity(paths.len());
    for path in &paths {
        if path.ends_with(".txt") {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read text page {}", path))?;
            inputs.push(PageInput::Text(text));
        } else {
            let bytes = std::fs::read(path)
                .with_context(|| format!("failed to read image page {}", path))?;
            inputs.push(PageInput::Image(STANDARD.encode(bytes)));
        }
    }

    logging::log_startup(inputs.len());

    let config = Config::from_env();
    let model = LlmService::new(&config);
    let flow = AnswerFlow::new(model, &config);

    let state = flow.process(&inputs).await;

    println!("{}", serde_json::to_string_pretty(&state.into_response())?);

    Ok(())
}
