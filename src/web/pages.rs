//! HTML pages.
//!
//! All markup is generated with [maud](https://maud.lambda.xyz/) —
//! compile-time checked, auto-escaped, no template directory to ship. The
//! small amount of CSS and the registration-form script are embedded
//! string constants.

use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::types::{COURSES, LEVELS, StudentRecord};

const CSS: &str = r#"
body { font-family: sans-serif; margin: 2rem auto; max-width: 48rem; color: #222; }
h1, h2 { color: #193782; }
label { display: block; margin-top: 0.75rem; font-weight: bold; }
input, select { padding: 0.4rem; width: 100%; max-width: 20rem; }
button { margin-top: 1rem; padding: 0.5rem 1.5rem; background: #193782; color: #fff; border: 0; cursor: pointer; }
table { border-collapse: collapse; width: 100%; }
th, td { border: 1px solid #ccc; padding: 0.4rem 0.6rem; text-align: left; }
img.asset { max-width: 220px; display: block; margin: 0.5rem 0; }
#result { margin-top: 1rem; }
.error { color: #a00; }
"#;

/// Reads the chosen photo as a data URI and submits the whole form as JSON
/// to `/save`.
const FORM_JS: &str = r#"
document.getElementById('reg-form').addEventListener('submit', function (ev) {
  ev.preventDefault();
  var result = document.getElementById('result');
  var file = document.getElementById('photo').files[0];
  if (!file) { result.innerHTML = '<p class="error">Choose a photo first.</p>'; return; }
  var reader = new FileReader();
  reader.onload = function () {
    var payload = {
      idno: document.getElementById('idno').value,
      lastname: document.getElementById('lastname').value,
      firstname: document.getElementById('firstname').value,
      course: document.getElementById('course').value,
      level: document.getElementById('level').value,
      photo_data: reader.result
    };
    fetch('/save', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify(payload)
    }).then(function (r) { return r.json().then(function (b) { return { ok: r.ok, body: b }; }); })
      .then(function (res) {
        if (res.ok) {
          result.innerHTML = '<p>Registered with id ' + res.body.id + '.</p>'
            + '<p><img class="asset" src="' + res.body.qr_url + '"></p>'
            + '<p><a href="/export/png/' + res.body.id + '">Download ID card (PNG)</a> | '
            + '<a href="/export/pdf/' + res.body.id + '">PDF</a></p>';
        } else {
          result.innerHTML = '<p class="error">' + res.body.msg + '</p>';
        }
      });
  };
  reader.readAsDataURL(file);
});
"#;

fn base_document(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { (title) }
                style { (PreEscaped(CSS)) }
            }
            body {
                (content)
            }
        }
    }
}

/// Registration form. Course and level lists are advisory — the selects
/// offer them, the server only checks for presence.
pub fn index() -> Markup {
    let content = html! {
        h1 { "Student Registration" }
        form id="reg-form" {
            label for="idno" { "Student ID No." }
            input id="idno" type="text" name="idno";
            label for="lastname" { "Last Name" }
            input id="lastname" type="text" name="lastname";
            label for="firstname" { "First Name" }
            input id="firstname" type="text" name="firstname";
            label for="course" { "Course" }
            select id="course" name="course" {
                @for course in COURSES {
                    option value=(course) { (course) }
                }
            }
            label for="level" { "Year Level" }
            select id="level" name="level" {
                @for level in LEVELS {
                    option value=(level) { (level) }
                }
            }
            label for="photo" { "Photo" }
            input id="photo" type="file" accept="image/*";
            button type="submit" { "Register" }
        }
        div id="result" {}
        p { a href="/records" { "All records" } }
        script { (PreEscaped(FORM_JS)) }
    };
    base_document("Student Registration", content)
}

/// Public viewer page — the target of the QR code.
pub fn student_view(record: &StudentRecord) -> Markup {
    let content = html! {
        h1 { "Student Record" }
        table {
            tr { th { "ID No." } td { (record.idno) } }
            tr { th { "Last Name" } td { (record.lastname) } }
            tr { th { "First Name" } td { (record.firstname) } }
            tr { th { "Program" } td { (record.course) } }
            tr { th { "Year Level" } td { (record.level) } }
            tr { th { "Registered" } td { (record.created_at.format("%Y-%m-%d %H:%M UTC")) } }
        }
        h2 { "Photo" }
        img class="asset" src=(format!("/uploads/{}", record.photo_path)) alt="student photo";
        h2 { "QR" }
        img class="asset" src=(format!("/uploads/{}", record.qr_path)) alt="qr code";
        p {
            a href=(format!("/export/png/{}", record.id)) { "Download ID card (PNG)" }
            " | "
            a href=(format!("/export/pdf/{}", record.id)) { "PDF" }
        }
    };
    base_document(&format!("Student {}", record.idno), content)
}

pub fn student_not_found(idno: &str) -> Markup {
    let content = html! {
        h1 { "Student with ID " (idno) " not found." }
        p { a href="/" { "Back to registration" } }
    };
    base_document("Not found", content)
}

/// Records listing, newest first.
pub fn records(students: &[StudentRecord]) -> Markup {
    let content = html! {
        h1 { "Registered Students" }
        @if students.is_empty() {
            p { "No records yet." }
        } @else {
            table {
                tr {
                    th { "ID" } th { "ID No." } th { "Last Name" } th { "First Name" }
                    th { "Program" } th { "Level" } th { "Registered" } th { "Card" }
                }
                @for s in students {
                    tr {
                        td { (s.id) }
                        td { a href=(format!("/student/{}", s.idno)) { (s.idno) } }
                        td { (s.lastname) }
                        td { (s.firstname) }
                        td { (s.course) }
                        td { (s.level) }
                        td { (s.created_at.format("%Y-%m-%d %H:%M")) }
                        td {
                            a href=(format!("/export/png/{}", s.id)) { "PNG" }
                            " "
                            a href=(format!("/export/pdf/{}", s.id)) { "PDF" }
                        }
                    }
                }
            }
        }
        p { a href="/" { "Back to registration" } }
    };
    base_document("Registered Students", content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_record() -> StudentRecord {
        StudentRecord {
            id: 3,
            idno: "2021-001".into(),
            lastname: "Cruz".into(),
            firstname: "Ana".into(),
            course: "BSIT".into(),
            level: "3".into(),
            photo_path: "2021-001_photo_1.jpg".into(),
            qr_path: "2021-001_qr_1.png".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn index_offers_advisory_lists() {
        let page = index().into_string();
        for course in COURSES {
            assert!(page.contains(course));
        }
        assert!(page.contains("reg-form"));
    }

    #[test]
    fn student_view_shows_submitted_fields() {
        let page = student_view(&test_record()).into_string();
        assert!(page.contains("2021-001"));
        assert!(page.contains("Cruz"));
        assert!(page.contains("Ana"));
        assert!(page.contains("BSIT"));
        assert!(page.contains("/uploads/2021-001_photo_1.jpg"));
        assert!(page.contains("/export/png/3"));
    }

    #[test]
    fn student_view_escapes_html() {
        let mut record = test_record();
        record.lastname = "<script>alert(1)</script>".into();
        let page = student_view(&record).into_string();
        assert!(!page.contains("<script>alert"));
        assert!(page.contains("&lt;script&gt;"));
    }

    #[test]
    fn not_found_names_the_id() {
        let page = student_not_found("9999").into_string();
        assert!(page.contains("9999"));
        assert!(page.contains("not found"));
    }

    #[test]
    fn records_lists_rows_and_export_links() {
        let page = records(&[test_record()]).into_string();
        assert!(page.contains("Cruz"));
        assert!(page.contains("/export/pdf/3"));
    }

    #[test]
    fn records_empty_state() {
        let page = records(&[]).into_string();
        assert!(page.contains("No records yet"));
    }
}
