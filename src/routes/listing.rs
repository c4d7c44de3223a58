use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::io;
use std::path::Path;
use tokio::fs;

const HREF: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

struct Entry {
    display: String,
    link: String,
}

/// Renders an HTML index of `dir`. `title_path` is the decoded request path.
pub async fn render(dir: &Path, title_path: &str) -> Result<String, io::Error> {
    let mut read_dir = fs::read_dir(dir).await?;
    let mut entries = Vec::new();
    while let Some(entry) = read_dir.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_link = match entry.file_type().await {
            Ok(file_type) => file_type.is_symlink(),
            Err(e) => {
                log::debug!("Skipping {:?} in listing: {}", entry.path(), e);
                continue;
            }
        };
        // follows symlinks
        let is_dir = fs::metadata(entry.path())
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);

        let link = if is_dir { format!("{}/", name) } else { name.clone() };
        let display = if is_link {
            format!("{}@", name)
        } else {
            link.clone()
        };
        entries.push(Entry { display, link });
    }
    entries.sort_by_cached_key(|e| e.link.to_lowercase());

    let title = escape(title_path);
    let items = entries
        .iter()
        .map(|e| {
            format!(
                "<li><a href=\"{}\">{}</a></li>\n",
                utf8_percent_encode(&e.link, HREF),
                escape(&e.display)
            )
        })
        .collect::<String>();

    Ok(format!(
        concat!(
            "<!DOCTYPE HTML>\n",
            "<html lang=\"en\">\n",
            "<head>\n",
            "<meta charset=\"utf-8\">\n",
            "<title>Directory listing for {title}</title>\n",
            "</head>\n",
            "<body>\n",
            "<h1>Directory listing for {title}</h1>\n",
            "<hr>\n",
            "<ul>\n",
            "{items}",
            "</ul>\n",
            "<hr>\n",
            "</body>\n",
            "</html>\n",
        ),
        title = title,
        items = items
    ))
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}
