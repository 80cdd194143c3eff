use std::path::Path;

use lopdf::{Document, Object, dictionary};
use tracing::debug;

use crate::error::{AppError, AppResult};

/// Rewrite the document information dictionary in place. Scanned paychecks
/// and bills arrive with whatever the scanner put there.
pub fn set_metadata(
    path: &Path,
    title: &str,
    author: &str,
    creator: &str,
    producer: &str,
) -> AppResult<()> {
    debug!(file = %path.display(), title, "rewriting pdf metadata");
    let mut document = Document::load(path)
        .map_err(|err| AppError::Document(format!("cannot load {}: {err}", path.display())))?;
    let info = dictionary! {
        "Title" => Object::string_literal(title),
        "Author" => Object::string_literal(author),
        "Creator" => Object::string_literal(creator),
        "Producer" => Object::string_literal(producer),
    };
    let info_id = match document
        .trailer
        .get(b"Info")
        .and_then(Object::as_reference)
    {
        Ok(existing) => {
            document.objects.insert(existing, Object::Dictionary(info));
            existing
        }
        Err(_) => document.add_object(Object::Dictionary(info)),
    };
    document.trailer.set("Info", Object::Reference(info_id));
    document
        .save(path)
        .map_err(|err| AppError::Document(format!("cannot save {}: {err}", path.display())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_pdf(path: &Path) {
        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();
        let page_id = document.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
        });
        document.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
            }),
        );
        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        document.trailer.set("Root", catalog_id);
        document.save(path).unwrap();
    }

    #[test]
    fn adds_an_information_dictionary_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paycheck.pdf");
        minimal_pdf(&path);

        set_metadata(&path, "Paycheck 2026-08", "Acme", "deskhand", "deskhand").unwrap();

        let document = Document::load(&path).unwrap();
        let info_id = document
            .trailer
            .get(b"Info")
            .and_then(Object::as_reference)
            .unwrap();
        let info = document.get_dictionary(info_id).unwrap();
        assert_eq!(
            info.get(b"Title").unwrap().as_str().unwrap(),
            b"Paycheck 2026-08"
        );
        assert_eq!(info.get(b"Author").unwrap().as_str().unwrap(), b"Acme");
    }

    #[test]
    fn replaces_an_existing_information_dictionary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.pdf");
        minimal_pdf(&path);
        set_metadata(&path, "first", "a", "b", "c").unwrap();
        set_metadata(&path, "second", "a", "b", "c").unwrap();

        let document = Document::load(&path).unwrap();
        let info_id = document
            .trailer
            .get(b"Info")
            .and_then(Object::as_reference)
            .unwrap();
        let info = document.get_dictionary(info_id).unwrap();
        assert_eq!(info.get(b"Title").unwrap().as_str().unwrap(), b"second");
    }
}
