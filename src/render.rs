//! Server-rendered pages. Every user-supplied string goes through [`escape`].

use thousands::Separable;
use time::OffsetDateTime;

use crate::{
    constants::{version::get_version, DISPLAY_DATETIME, MAX_QUOTES_PER_SOURCE},
    flash::{Flash, Level},
    models::{quotes::Quote, sources::Source, stats::DashboardStats},
    pagination::Page,
};

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; max-width: 46rem; margin: 2rem auto; padding: 0 1rem; color: #222; }
nav a { margin-right: 1rem; }
blockquote { font-size: 1.3rem; border-left: 4px solid #888; margin: 1.5rem 0; padding: 0.5rem 1rem; }
.meta { color: #666; font-size: 0.9rem; }
.flash { padding: 0.6rem 1rem; border-radius: 4px; margin: 1rem 0; }
.flash-success { background: #e3f6e5; color: #1d5e28; }
.flash-error { background: #fbe4e4; color: #8a1c1c; }
.quote-list li { margin-bottom: 1rem; }
form { margin: 1rem 0; }
form label { display: block; margin-top: 0.5rem; }
table { border-collapse: collapse; }
td, th { padding: 0.3rem 0.8rem; text-align: left; }
"#;

const VOTE_SCRIPT: &str = r#"
document.querySelectorAll("button[data-vote]").forEach((button) => {
  button.addEventListener("click", async () => {
    const id = button.dataset.quote;
    const response = await fetch(`/quotes/${id}/vote`, {
      method: "POST",
      headers: { "Content-Type": "application/x-www-form-urlencoded" },
      body: new URLSearchParams({ action: button.dataset.vote }),
    });
    if (!response.ok) return;
    const tally = await response.json();
    document.getElementById(`likes-${id}`).textContent = tally.likes;
    document.getElementById(`dislikes-${id}`).textContent = tally.dislikes;
    document.getElementById(`rating-${id}`).textContent = tally.rating;
  });
});
"#;

pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());

    for c in input.chars() {
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

fn format_datetime(at: OffsetDateTime) -> String {
    at.format(DISPLAY_DATETIME)
        .unwrap_or_else(|_| at.unix_timestamp().to_string())
}

fn flash_banner(flash: Option<&Flash>) -> String {
    let Some(flash) = flash else {
        return String::new();
    };

    let class = match flash.level {
        Level::Success => "flash flash-success",
        Level::Error => "flash flash-error",
    };

    format!(
        "<div class=\"{}\" role=\"status\">{}</div>",
        class,
        escape(&flash.message)
    )
}

pub fn layout(title: &str, flash: Option<&Flash>, body: &str) -> String {
    format!(
        "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\">\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
<title>{title} · quoteboard</title><style>{STYLE}</style></head><body>\
<nav><a href=\"/\">Random quote</a><a href=\"/popular\">Popular</a>\
<a href=\"/quotes\">All quotes</a><a href=\"/dashboard\">Dashboard</a></nav>\
{flash}{body}\
<footer class=\"meta\"><p>quoteboard {version}</p></footer>\
<script>{VOTE_SCRIPT}</script></body></html>",
        title = escape(title),
        flash = flash_banner(flash),
        body = body,
        version = escape(&get_version()),
    )
}

fn vote_controls(quote: &Quote) -> String {
    format!(
        "<p class=\"meta\">\
<button type=\"button\" data-vote=\"like\" data-quote=\"{id}\">👍 <span id=\"likes-{id}\">{likes}</span></button> \
<button type=\"button\" data-vote=\"dislike\" data-quote=\"{id}\">👎 <span id=\"dislikes-{id}\">{dislikes}</span></button> \
rating <strong id=\"rating-{id}\">{rating}</strong> · {percentage:.0}% liked · {views} {noun}</p>",
        id = quote.id,
        likes = quote.likes,
        dislikes = quote.dislikes,
        rating = quote.rating(),
        percentage = quote.like_percentage(),
        views = quote.views_count.separate_with_commas(),
        noun = if quote.views_count == 1 { "view" } else { "views" },
    )
}

fn add_quote_form(sources: &[Source]) -> String {
    if sources.is_empty() {
        return "<p class=\"meta\">Add a source first; every source holds at most \
            three quotes.</p>"
            .to_string();
    }

    let options: String = sources
        .iter()
        .map(|source| {
            format!(
                "<option value=\"{}\">{} ({}/{})</option>",
                source.id,
                escape(&source.title),
                source.quote_count,
                MAX_QUOTES_PER_SOURCE
            )
        })
        .collect();

    format!(
        "<form method=\"post\" action=\"/quotes\">\
<label for=\"text\">Quote</label><textarea id=\"text\" name=\"text\" rows=\"3\" required></textarea>\
<label for=\"source\">Source</label><select id=\"source\" name=\"source\">{options}</select>\
<label for=\"weight\">Weight</label><input id=\"weight\" name=\"weight\" type=\"number\" min=\"1\" value=\"1\">\
<p><button type=\"submit\">Add quote</button></p></form>"
    )
}

fn add_source_form() -> &'static str {
    "<form method=\"post\" action=\"/sources\">\
<label for=\"title\">Title</label><input id=\"title\" name=\"title\" maxlength=\"200\" required>\
<p><button type=\"submit\">Add source</button></p></form>"
}

pub fn random_quote_page(quote: Option<&Quote>, sources: &[Source], flash: Option<&Flash>) -> String {
    let mut body = String::new();

    match quote {
        Some(quote) => {
            body.push_str(&format!(
                "<blockquote><p>{}</p><footer>— {}</footer></blockquote>",
                escape(&quote.text),
                escape(&quote.source_title)
            ));
            body.push_str(&vote_controls(quote));
        }
        None => body.push_str(
            "<p class=\"empty\">No quotes yet. Add a source and a quote below to get started.</p>",
        ),
    }

    body.push_str("<h2>Add a quote</h2>");
    body.push_str(&add_quote_form(sources));
    body.push_str("<h2>Add a source</h2>");
    body.push_str(add_source_form());

    layout("Random quote", flash, &body)
}

fn pager(base_path: &str, page: &Page) -> String {
    let mut out = String::from("<p class=\"meta\">");

    if page.has_previous() {
        out.push_str(&format!(
            "<a href=\"{base_path}?page=1\">« first</a> \
<a href=\"{base_path}?page={}\">‹ previous</a> ",
            page.number - 1
        ));
    }

    out.push_str(&format!("page {} of {}", page.number, page.num_pages));

    if page.has_next() {
        out.push_str(&format!(
            " <a href=\"{base_path}?page={}\">next ›</a> \
<a href=\"{base_path}?page={}\">last »</a>",
            page.number + 1,
            page.num_pages
        ));
    }

    out.push_str("</p>");
    out
}

pub fn quote_list_page(
    heading: &str,
    base_path: &str,
    page: &Page,
    quotes: &[Quote],
    flash: Option<&Flash>,
) -> String {
    let mut body = format!("<h1>{}</h1>", escape(heading));

    if quotes.is_empty() {
        body.push_str("<p class=\"empty\">No quotes yet.</p>");
    } else {
        body.push_str(&format!(
            "<ol class=\"quote-list\" start=\"{}\">",
            page.start_index()
        ));

        for quote in quotes {
            body.push_str(&format!(
                "<li><p>{}</p><p class=\"meta\">— {} · added {}</p>{}</li>",
                escape(&quote.text),
                escape(&quote.source_title),
                format_datetime(quote.created_at),
                vote_controls(quote)
            ));
        }

        body.push_str("</ol>");
    }

    body.push_str(&pager(base_path, page));

    layout(heading, flash, &body)
}

pub fn dashboard_page(stats: &DashboardStats, flash: Option<&Flash>) -> String {
    let mut body = String::from("<h1>Dashboard</h1><table><tbody>");

    for (label, value) in [
        ("Quotes", stats.total_quotes),
        ("Sources", stats.total_sources),
        ("Views", stats.total_views),
        ("Likes", stats.total_likes),
    ] {
        body.push_str(&format!(
            "<tr><th>{}</th><td>{}</td></tr>",
            label,
            value.separate_with_commas()
        ));
    }

    body.push_str("</tbody></table><h2>Most liked sources</h2>");

    if stats.popular_sources.is_empty() {
        body.push_str("<p class=\"empty\">No sources yet.</p>");
    } else {
        body.push_str("<table><thead><tr><th>Source</th><th>Quotes</th><th>Likes</th></tr></thead><tbody>");

        for source in &stats.popular_sources {
            body.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(&source.title),
                source.total_quotes,
                source.total_likes.separate_with_commas()
            ));
        }

        body.push_str("</tbody></table>");
    }

    layout("Dashboard", flash, &body)
}
