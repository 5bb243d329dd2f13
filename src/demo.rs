use crate::labels::CanonicalLabel;

/// Everything the demo page can show.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DemoPage {
    pub text: String,
    pub prediction: Option<CanonicalLabel>,
    pub raw: Option<String>,
    pub error: Option<String>,
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

impl DemoPage {
    pub fn render(&self) -> String {
        let mut result = String::new();
        if let Some(prediction) = self.prediction {
            result.push_str(&format!(
                "    <p><strong>Prediction (0/1):</strong> {prediction}</p>\n"
            ));
            if let Some(raw) = &self.raw {
                result.push_str(&format!(
                    "    <p style=\"color:#666\">Raw model label: <code>{}</code></p>\n",
                    escape_html(raw)
                ));
            }
        }
        if let Some(error) = &self.error {
            result.push_str(&format!(
                "    <h3>Error</h3>\n    <pre style=\"white-space:pre-wrap\">{}</pre>\n",
                escape_html(error)
            ));
        }

        format!(
            r#"<!doctype html>
<html>
  <head><meta charset="utf-8"><title>newsclf demo</title></head>
  <body style="font-family: system-ui, sans-serif; max-width: 720px; margin: 32px auto;">
    <h2>newsclf demo</h2>
    <form method="POST">
      <textarea name="text" rows="6" style="width:100%;" placeholder="Enter text...">{text}</textarea><br><br>
      <button type="submit">Predict</button>
    </form>
{result}  </body>
</html>
"#,
            text = escape_html(&self.text),
        )
    }
}
