use std::collections::BTreeMap;

use url::Url;

use super::request::{DispatchRequest, ManifestEntry};

/// Render the manifest into one linear HTML document.
///
/// Text entries are substituted verbatim (HTML-escaped, newlines become
/// line breaks) and image entries become references to their uploaded
/// asset, in original manifest order — order is never reshuffled. The
/// document closes with the attachments list (if any), the
/// closing/signature footer, and the disclaimer footer.
///
/// `image_urls` must hold an entry for every image position in the
/// manifest; positions without one are skipped, so callers resolve parts
/// before rendering (the [`Dispatcher`](super::Dispatcher) does).
#[must_use]
pub fn render_document(
    request: &DispatchRequest,
    image_urls: &BTreeMap<usize, Url>,
    document_links: &[(String, Url)],
) -> String {
    let mut content = String::new();

    for (i, entry) in request.manifest.iter().enumerate() {
        match entry {
            ManifestEntry::Text { value } => {
                content.push_str("<div style=\"margin-bottom:20px;line-height:1.6;\">");
                content.push_str(&text_to_html(value));
                content.push_str("</div>\n");
            }
            ManifestEntry::Image { .. } => {
                if let Some(url) = image_urls.get(&i) {
                    content.push_str("<div style=\"margin-bottom:20px;text-align:center;\">");
                    content.push_str(&format!(
                        "<img src=\"{url}\" style=\"max-width:100%;height:auto;\"/>"
                    ));
                    content.push_str("</div>\n");
                }
            }
        }
    }

    if !document_links.is_empty() {
        content.push_str(
            "<div style=\"margin-top:30px;padding-top:20px;border-top:1px solid #e2e8f0;\">\
             <div style=\"font-weight:600;margin-bottom:16px;\">Attachments</div>\n",
        );
        for (filename, url) in document_links {
            content.push_str(&format!(
                "<div><a href=\"{url}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a></div>\n",
                escape_html(filename)
            ));
        }
        content.push_str("</div>\n");
    }

    content.push_str(&format!(
        "<div style=\"margin-top:30px;padding-top:20px;border-top:1px solid #e2e8f0;\">\
         <div style=\"margin-bottom:8px;\">{},</div>\
         <div style=\"font-weight:600;\">{}</div></div>\n",
        escape_html(&request.closing),
        escape_html(&request.signature),
    ));

    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>{subject}</title>\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         </head>\n\
         <body style=\"background-color:#f7fafc;margin:0;padding:20px 0;\
         font-family:Helvetica,Arial,sans-serif;color:#2d3748;\">\n\
         <div style=\"max-width:600px;margin:0 auto;background-color:#ffffff;\
         border-radius:8px;overflow:hidden;\">\n\
         <div style=\"padding:36px 40px;\">\n\
         {content}\
         </div>\n\
         <div style=\"background-color:#2f2f2f;color:#cbd5e0;padding:30px 20px;\
         text-align:center;font-size:14px;\">\n\
         <p>This email was sent to {to}. If you believe this was sent in error, \
         please contact the sender.</p>\n\
         <p>{disclaimer}</p>\n\
         </div>\n\
         </div>\n\
         </body>\n\
         </html>\n",
        subject = escape_html(&request.subject),
        to = escape_html(request.to.as_str()),
        // Operator-controlled copy; rendered verbatim so it may carry markup.
        disclaimer = request.disclaimer,
    )
}

/// Escape text, then turn newlines into `<br/>`.
fn text_to_html(value: &str) -> String {
    escape_html(value).replace('\n', "<br/>")
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::dispatch::request::DispatchRequest;
    use crate::types::EmailAddress;

    fn request(manifest: Vec<ManifestEntry>) -> DispatchRequest {
        DispatchRequest {
            from_name: "Support".into(),
            from_email: "support@example.com".into(),
            to: EmailAddress::try_from("dest@example.com".to_owned()).unwrap(),
            subject: "Subject".into(),
            closing: "Regards".into(),
            signature: "The Team".into(),
            disclaimer: "Do not reply.".into(),
            manifest,
            images: BTreeMap::new(),
            documents: Vec::new(),
        }
    }

    #[test]
    fn blocks_render_in_manifest_order() {
        let mut urls = BTreeMap::new();
        urls.insert(2, "https://assets.example.com/a.png".parse::<Url>().unwrap());

        let html = render_document(
            &request(vec![
                ManifestEntry::text("Hello"),
                ManifestEntry::text("World"),
                ManifestEntry::image_placeholder(2),
            ]),
            &urls,
            &[],
        );

        let hello = html.find("Hello").unwrap();
        let world = html.find("World").unwrap();
        let image = html.find("https://assets.example.com/a.png").unwrap();
        assert!(hello < world);
        assert!(world < image);
    }

    #[test]
    fn text_is_escaped_and_newlines_become_breaks() {
        let html = render_document(
            &request(vec![ManifestEntry::text("a<b>\n&c")]),
            &BTreeMap::new(),
            &[],
        );
        assert!(html.contains("a&lt;b&gt;<br/>&amp;c"));
    }

    #[test]
    fn footer_carries_recipient_and_disclaimer() {
        let html = render_document(&request(vec![]), &BTreeMap::new(), &[]);
        assert!(html.contains("This email was sent to dest@example.com."));
        assert!(html.contains("Do not reply."));
        assert!(html.contains("Regards,"));
        assert!(html.contains("The Team"));
    }

    #[test]
    fn attachments_section_lists_documents() {
        let links = vec![(
            "report.pdf".to_string(),
            "https://assets.example.com/report.pdf".parse::<Url>().unwrap(),
        )];
        let html = render_document(&request(vec![]), &BTreeMap::new(), &links);
        assert!(html.contains("Attachments"));
        assert!(html.contains("report.pdf"));
        assert!(html.contains("https://assets.example.com/report.pdf"));
    }

    #[test]
    fn no_attachments_section_without_documents() {
        let html = render_document(&request(vec![]), &BTreeMap::new(), &[]);
        assert!(!html.contains("Attachments"));
    }
}
