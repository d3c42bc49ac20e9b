// HTML for the curriculum form and its result page.
//
// Pages are plain `format!` templates. Every user-supplied or remote value
// goes through `escape` before it is interpolated.

use crate::core::curriculum::{CurriculumError, FormParameters, PublishedCurriculum};
use quick_xml::escape::escape;

const STYLE: &str = "body{font-family:system-ui,sans-serif;max-width:52rem;margin:2rem auto;padding:0 1rem;line-height:1.45}\
label{display:block;margin-top:1rem;font-weight:600}\
input,textarea{width:100%;box-sizing:border-box;padding:.4rem;font:inherit}\
textarea{min-height:8rem}\
button{margin-top:1.5rem;padding:.6rem 1.2rem;font:inherit}\
.error{border-left:4px solid #c62828;background:#fdecea;padding:.6rem 1rem}\
.ok{border-left:4px solid #2e7d32;background:#edf7ed;padding:.6rem 1rem}\
pre{white-space:pre-wrap;background:#f6f6f6;padding:1rem}\
.hint{color:#666;font-size:.9rem}";

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!doctype html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{}</title><style>{}</style></head><body>{}</body></html>",
        escape(title),
        STYLE,
        body
    )
}

/// The form, pre-filled with `params`. The API key is never echoed back.
pub fn form_page(params: &FormParameters, error: Option<&CurriculumError>) -> String {
    let error_block = error
        .map(|e| {
            format!(
                "<div class=\"error\"><strong>Failed during {}.</strong><br>{}</div>",
                escape(e.stage()),
                escape(e.to_string().as_str())
            )
        })
        .unwrap_or_default();

    let body = format!(
        "<h1>AI Curriculum Generator</h1>\
         <p>Enter the details below, and the AI will generate a curriculum, save it as a \
         Google Doc, and provide a shareable link.</p>\
         {error}\
         <form method=\"post\" action=\"/generate\">\
         <label for=\"api_key\">Google Gemini API key</label>\
         <input id=\"api_key\" name=\"api_key\" type=\"password\" autocomplete=\"off\">\
         <label for=\"subject\">Subject / Course title</label>\
         <input id=\"subject\" name=\"subject\" value=\"{subject}\">\
         <label for=\"audience\">Target audience</label>\
         <input id=\"audience\" name=\"audience\" value=\"{audience}\">\
         <label for=\"duration\">Course duration (e.g., 8 weeks, 1 semester)</label>\
         <input id=\"duration\" name=\"duration\" value=\"{duration}\">\
         <label for=\"objectives\">Key learning objectives (one per line)</label>\
         <textarea id=\"objectives\" name=\"objectives\">{objectives}</textarea>\
         <label for=\"topics\">Key topics / modules (one per line)</label>\
         <textarea id=\"topics\" name=\"topics\">{topics}</textarea>\
         <label for=\"instructions\">Any other instructions for the AI?</label>\
         <textarea id=\"instructions\" name=\"instructions\">{instructions}</textarea>\
         <button type=\"submit\">Generate Curriculum &amp; Google Doc</button>\
         </form>\
         <p class=\"hint\">The first submission asks you to approve Google access: open the \
         link printed in the server console. Make sure the client registration file is in \
         place.</p>",
        error = error_block,
        subject = escape(params.subject.as_str()),
        audience = escape(params.audience.as_str()),
        duration = escape(params.duration.as_str()),
        objectives = escape(params.objectives.as_str()),
        topics = escape(params.topics.as_str()),
        instructions = escape(params.instructions.as_str()),
    );

    layout("Curriculum Generator", &body)
}

pub fn result_page(published: &PublishedCurriculum) -> String {
    let body = format!(
        "<h1>Success!</h1>\
         <div class=\"ok\">Your curriculum has been generated and saved as a Google Doc. \
         You can access it here:<br><strong><a href=\"{link}\">{title}</a></strong></div>\
         <h2>Generated content</h2>\
         <pre>{content}</pre>\
         <p><a href=\"/\">Generate another curriculum</a></p>",
        link = escape(published.view_link.as_str()),
        title = escape(published.title.as_str()),
        content = escape(published.body.as_str()),
    );

    layout(&published.title, &body)
}
