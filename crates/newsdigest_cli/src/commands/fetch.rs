use std::io::Write;
use std::path::PathBuf;

use newsdigest::NewsCrawler;

use crate::config::Config;

pub(crate) async fn handle_fetch(
    config: &Config,
    url: &url::Url,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let crawler = NewsCrawler::new(config.crawl_options())?;

    let Some(content) = crawler.extract(url.as_str()).await? else {
        return Err(format!("{url} is not an article page").into());
    };
    let text = content.render_text();

    match output {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, &text)?;
            tracing::info!(url = %url, path = %path.display(), "Saved article");
            println!("Saved {} to {}", url, path.display());
        }
        None => {
            let mut stdout = std::io::stdout();
            stdout.write_all(text.as_bytes())?;
            if !text.ends_with('\n') {
                writeln!(stdout)?;
            }
        }
    }

    Ok(())
}
