//! HTML rendering for the Employee Vault pages.
//!
//! Every page shares one layout (navbar, content, footer). Content is built
//! by string concatenation; anything that came from a user or the database
//! goes through [`escape`] first.

use std::fmt::Write as _;

use employee_vault_storage::EmployeeTable;

/// The three navigable pages, in navbar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    AddEmployee,
    Employees,
    EncryptedEmployees,
}

impl Page {
    const ALL: [Self; 3] = [Self::AddEmployee, Self::Employees, Self::EncryptedEmployees];

    pub fn path(self) -> &'static str {
        match self {
            Self::AddEmployee => "/",
            Self::Employees => "/employees",
            Self::EncryptedEmployees => "/employees/encrypted",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::AddEmployee => "Add Employee",
            Self::Employees => "View Employees",
            Self::EncryptedEmployees => "Encrypted View",
        }
    }
}

/// A status message shown above the page content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    Success(String),
    Error(String),
}

impl Banner {
    fn render(&self) -> String {
        let (class, text) = match self {
            Self::Success(text) => ("success", text),
            Self::Error(text) => ("error", text),
        };
        format!(r#"<div class="message {class}">{}</div>"#, escape(text))
    }
}

/// Wrap `content` in the shared layout with `active` highlighted.
pub fn layout(active: Page, content: &str) -> String {
    let mut html = String::with_capacity(LAYOUT_HEAD.len() + content.len() + 1024);
    html.push_str(LAYOUT_HEAD);
    html.push_str("<body>\n<div class=\"navbar\">\n");
    for page in Page::ALL {
        let class = if page == active { r#" class="active""# } else { "" };
        let _ = writeln!(html, r#"  <a href="{}"{class}>{}</a>"#, page.path(), page.label());
    }
    html.push_str("  <div class=\"navbar-title\">HashiCorp Vault Demo</div>\n</div>\n");
    html.push_str("<div class=\"content\">\n");
    html.push_str(content);
    html.push_str("\n</div>\n");
    html.push_str(LAYOUT_FOOT);
    html
}

/// The add-employee page: optional banner, then the form.
pub fn add_employee_page(banner: Option<&Banner>) -> String {
    let mut content = banner.map(Banner::render).unwrap_or_default();
    content.push_str(EMPLOYEE_FORM);
    layout(Page::AddEmployee, &content)
}

/// A titled table page.
pub fn table_page(active: Page, title: &str, table: &EmployeeTable) -> String {
    layout(active, &employee_table(title, table))
}

/// An error-only page for a failed listing.
pub fn banner_page(active: Page, banner: &Banner) -> String {
    layout(active, &banner.render())
}

/// Render `table` with its column names as headers. Cells carry a `title`
/// attribute so truncated values can be read on hover.
pub fn employee_table(title: &str, table: &EmployeeTable) -> String {
    let mut html = String::with_capacity(256 + table.rows.len() * 256);
    let _ = write!(
        html,
        "<h2>{}</h2>\n<div class=\"table-container\">\n<table>\n<tr>",
        escape(title)
    );
    for column in &table.columns {
        let _ = write!(html, "<th>{}</th>", escape(column));
    }
    html.push_str("</tr>\n");
    for row in &table.rows {
        html.push_str("<tr>");
        for cell in row.cells() {
            let cell = escape(&cell);
            let _ = write!(html, r#"<td title="{cell}">{cell}</td>"#);
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</table>\n</div>");
    html
}

/// Escape text for use in element content and double-quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

/// Document head and stylesheet shared by every page.
const LAYOUT_HEAD: &str = r##"<!DOCTYPE html>
<html lang="en"><head><meta charset="utf-8"/><meta name="viewport" content="width=device-width,initial-scale=1"/>
<title>Employee Vault</title>
<style>
*{box-sizing:border-box}
body{margin:0;font-family:-apple-system,'Segoe UI',Roboto,sans-serif;background:#FFFFFF;color:#000000;display:flex;flex-direction:column;min-height:100vh}
.navbar{display:flex;align-items:center;background:#000000;padding:1rem 2rem;position:sticky;top:0;z-index:100}
.navbar a{color:#FFFFFF;text-decoration:none;margin-right:1.5rem;font-size:1.1rem;font-weight:500;padding:.5rem 1rem;border-radius:8px;transition:background-color .3s}
.navbar a:hover{background:#4A4A4A}
.navbar a.active{background:#FFFFFF;color:#000000}
.navbar-title{margin-left:auto;color:#FFFFFF;font-size:1.2rem;font-weight:600}
.content{flex:1;padding:2rem;max-width:1200px;width:100%;margin:0 auto}
h2{font-size:1.8rem;margin-bottom:1.5rem}
.form-container{max-width:600px;margin:0 auto;border:2px solid #000000;border-radius:16px;padding:2rem;max-height:70vh;overflow-y:auto}
.form-group{margin-bottom:1.25rem}
label{display:block;font-weight:600;margin-bottom:.5rem}
input[type="text"],input[type="email"],input[type="tel"]{width:100%;padding:.75rem;border:2px solid #000000;border-radius:8px;font-size:1rem;transition:border-color .3s,transform .2s}
input[type="text"]:focus,input[type="email"]:focus,input[type="tel"]:focus{outline:none;border-color:#4A4A4A;transform:scale(1.02)}
input[type="submit"]{background:#000000;color:#FFFFFF;padding:.8rem;border:none;border-radius:8px;cursor:pointer;font-size:1.1rem;font-weight:600;width:100%;transition:background-color .3s,transform .2s}
input[type="submit"]:hover{background:#4A4A4A;transform:translateY(-2px)}
.table-container{overflow-x:auto;border:2px solid #000000;border-radius:16px;margin-top:2rem}
table{width:100%;border-collapse:collapse}
th,td{padding:1rem;text-align:left;border-bottom:1px solid #000000}
th{background:#000000;color:#FFFFFF;font-weight:600;position:sticky;top:0}
tr:hover{background:#F2F2F2}
td{max-width:200px;overflow:hidden;text-overflow:ellipsis;white-space:nowrap}
.message{padding:1rem;margin:1rem 0;border-radius:8px;font-weight:500;text-align:center}
.success{background:#E5E5E5}
.error{background:#FFD1D1}
.footer{background:#000000;color:#FFFFFF;text-align:center;padding:1rem;font-size:.9rem}
@media(max-width:768px){.content{padding:1rem}.navbar{padding:.5rem}.navbar a{margin:0 .5rem;font-size:1rem}th,td{padding:.75rem;font-size:.9rem}td{max-width:150px}}
</style></head>
"##;

const LAYOUT_FOOT: &str = r##"<div class="footer">&copy; 2025 Employee Vault | Built with Rust &amp; Axum</div>
</body></html>
"##;

/// The add-employee form. Field names match [`super::employees::EmployeeForm`].
const EMPLOYEE_FORM: &str = r##"<h2>Add Employee</h2>
<div class="form-container">
<form method="POST">
  <div class="form-group"><label for="name">Name</label><input type="text" name="name" id="name" required placeholder="Enter Name"></div>
  <div class="form-group"><label for="role">Role</label><input type="text" name="role" id="role" required placeholder="Enter Role"></div>
  <div class="form-group"><label for="email">Email</label><input type="email" name="email" id="email" required placeholder="Enter Email"></div>
  <div class="form-group"><label for="phone">Phone</label><input type="tel" name="phone" id="phone" required placeholder="Enter Phone (10 digits)"></div>
  <div class="form-group"><label for="ssn">SSN</label><input type="text" name="ssn" id="ssn" required placeholder="Enter SSN (9 digits)"></div>
  <div class="form-group"><label for="address">Address</label><input type="text" name="address" id="address" required placeholder="Enter Address"></div>
  <input type="submit" value="Add Employee">
</form>
</div>"##;

#[cfg(test)]
mod tests {
    use super::*;
    use employee_vault_storage::{EmployeeRecord, NewEmployee};

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(
            escape(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/a&gt;"
        );
        assert_eq!(escape("vault:v1:abc+/="), "vault:v1:abc+/=");
    }

    #[test]
    fn layout_marks_only_the_active_page() {
        let html = layout(Page::Employees, "<p>hi</p>");
        assert!(html.contains(r#"<a href="/employees" class="active">View Employees</a>"#));
        assert!(html.contains(r#"<a href="/">Add Employee</a>"#));
        assert!(html.contains(r#"<a href="/employees/encrypted">Encrypted View</a>"#));
        assert_eq!(html.matches(r#"class="active""#).count(), 1);
        assert!(html.contains("<p>hi</p>"));
        assert!(html.contains("class=\"footer\""));
    }

    #[test]
    fn banner_is_escaped_and_classed() {
        let html = add_employee_page(Some(&Banner::Error("Error: <boom>".to_owned())));
        assert!(html.contains(r#"<div class="message error">Error: &lt;boom&gt;</div>"#));
        assert!(html.contains(r#"<form method="POST">"#));

        let html = add_employee_page(None);
        assert!(!html.contains("class=\"message"));
    }

    #[test]
    fn table_renders_headers_and_escaped_cells() {
        let table = EmployeeTable {
            columns: EmployeeTable::default_columns(),
            rows: vec![EmployeeRecord::from_new(
                3,
                NewEmployee {
                    name: "<b>Ana</b>".to_owned(),
                    role: "Eng".to_owned(),
                    email: "a@x.com".to_owned(),
                    phone_number: "555".to_owned(),
                    ssn: "123".to_owned(),
                    address: "1 Main St".to_owned(),
                },
            )],
        };
        let html = employee_table("Employee Records", &table);
        assert!(html.starts_with("<h2>Employee Records</h2>"));
        assert!(html.contains("<th>id</th><th>name</th><th>role</th><th>email</th>"));
        assert!(html.contains("<th>phone_number</th><th>ssn</th><th>address</th>"));
        assert!(html.contains(r#"<td title="3">3</td>"#));
        assert!(html.contains(r#"<td title="&lt;b&gt;Ana&lt;/b&gt;">&lt;b&gt;Ana&lt;/b&gt;</td>"#));
        assert!(!html.contains("<b>Ana"));
    }

    #[test]
    fn empty_table_still_has_headers() {
        let table = EmployeeTable {
            columns: EmployeeTable::default_columns(),
            rows: Vec::new(),
        };
        let html = employee_table("Encrypted Employee Records", &table);
        assert_eq!(html.matches("<th>").count(), 7);
        assert!(!html.contains("<td"));
    }
}
