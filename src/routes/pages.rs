//! Browser-facing HTML. Type and size of the upload are only checked here,
//! client side; the server trusts whatever it receives.

pub const UPLOAD_FORM: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Upload your ultrasound image</title>
  <style>
    body { font-family: Arial, sans-serif; background-color: #f0f8ff; display: flex; align-items: center; justify-content: center; height: 100vh; margin: 0; }
    .container { text-align: center; background-color: #ffffff; border: 2px dashed #0073e6; border-radius: 8px; box-shadow: 0 4px 8px rgba(0, 0, 0, 0.2); padding: 40px; width: 80%; max-width: 400px; color: #555; }
    h1 { font-size: 20px; color: #0073e6; margin-bottom: 20px; }
    #drop-area { border: 2px dashed #0073e6; padding: 30px; border-radius: 8px; cursor: pointer; background-color: #f9f9f9; }
    #drop-area:hover { background-color: #e6f3ff; }
    .instructions { font-size: 14px; color: #333; margin-top: 10px; }
  </style>
</head>
<body>
  <div class="container">
    <h1>Upload your ultrasound image</h1>
    <form action="/upload" method="POST" enctype="multipart/form-data" id="upload-form">
      <div id="drop-area">
        <p>Drop your image here or click to pick one</p>
        <input type="file" name="image" id="image" accept=".jpeg, .jpg, .png, .webp" style="display: none;" required />
      </div>
      <div class="instructions">JPEG, PNG or WEBP images under 5MB only.</div>
    </form>
  </div>
  <script>
    const MAX_SIZE = 5 * 1024 * 1024;
    const VALID_TYPES = ["image/jpeg", "image/png", "image/webp"];
    const dropArea = document.getElementById("drop-area");
    const fileInput = document.getElementById("image");
    const form = document.getElementById("upload-form");

    function validateFile(file) {
      if (!file) return false;
      if (!VALID_TYPES.includes(file.type)) { alert("Only JPEG, PNG or WEBP files are accepted."); return false; }
      if (file.size > MAX_SIZE) { alert("The file must be smaller than 5MB."); return false; }
      return true;
    }

    dropArea.addEventListener("click", () => fileInput.click());
    fileInput.addEventListener("change", () => { if (validateFile(fileInput.files[0])) form.submit(); });
    dropArea.addEventListener("dragover", (e) => { e.preventDefault(); dropArea.style.backgroundColor = "#e6f3ff"; });
    dropArea.addEventListener("dragleave", () => { dropArea.style.backgroundColor = "#f9f9f9"; });
    dropArea.addEventListener("drop", (e) => {
      e.preventDefault();
      dropArea.style.backgroundColor = "#f9f9f9";
      if (validateFile(e.dataTransfer.files[0])) { fileInput.files = e.dataTransfer.files; form.submit(); }
    });
  </script>
</body>
</html>
"##;

pub const STILL_PROCESSING: &str =
    "<p>The image is still being generated. Try again in a few seconds.</p>";

/// Page shown after a job was accepted, refreshes into the result route
pub fn processing_page(generation_id: &str, redirect_delay: u32) -> String {
    let url = format!("/result/{}", urlencoding::encode(generation_id));
    let id = escape_html(generation_id);
    format!(
        r#"<html>
  <head>
    <meta http-equiv="refresh" content="{delay};url={url}" />
  </head>
  <body>
    <p>Image is being generated with ID: {id}</p>
    <p>You will be redirected automatically in a few seconds. If not, <a href="{url}">click here to see the result</a>.</p>
  </body>
</html>
"#,
        delay = redirect_delay,
        url = url,
        id = id,
    )
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
