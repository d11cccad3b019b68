//! PDF concatenation.
//!
//! [`merge_documents`] appends the pages of each input, in input order and in each input's own page
//! order, into one new document. Inputs are loaded one by one; an input that fails to load, is
//! encrypted, or has no pages is reported as [`MergeSkipped`] and the rest still merge.
//!
//! Page attributes that PDF lets a page inherit from its page-tree ancestors (`Resources`,
//! `MediaBox`, `CropBox`, `Rotate`) are copied onto each page before it is moved under the new page
//! tree, so pages keep their size and fonts.

use lopdf::{dictionary, Document, Object, ObjectId};

use super::*;

/// Page attributes a page may inherit from its ancestors.
const INHERITABLE_ATTRIBUTES: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Result of a concatenation.
#[derive(Debug, Default)]
pub struct MergeReport {
  /// The written document; absent when no input could be merged.
  pub output:  Option<PathBuf>,
  /// Inputs that made it into the output, in order.
  pub merged:  Vec<PathBuf>,
  /// Inputs that were left out.
  pub skipped: Vec<MergeSkipped>,
}

/// Concatenates `inputs` into a new PDF at `output`.
///
/// Unreadable inputs are skipped, not fatal. An error is only returned when the combined document
/// cannot be written.
///
/// ```no_run
/// use std::path::{Path, PathBuf};
///
/// use gleaner::pdf::merge_documents;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let inputs = vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")];
/// let report = merge_documents(&inputs, Path::new("merged.pdf"))?;
/// for skipped in &report.skipped {
///   eprintln!("{skipped}");
/// }
/// # Ok(())
/// # }
/// ```
pub fn merge_documents(inputs: &[PathBuf], output: &Path) -> Result<MergeReport> {
  let mut report = MergeReport::default();
  let mut loaded = Vec::new();

  for path in inputs {
    match load_mergeable(path) {
      Ok(document) => {
        report.merged.push(path.clone());
        loaded.push(document);
      },
      Err(reason) => {
        let skipped = MergeSkipped { path: path.clone(), reason };
        warn!("{skipped}");
        report.skipped.push(skipped);
      },
    }
  }

  if loaded.is_empty() {
    debug!("Nothing to merge into {}", output.display());
    return Ok(report);
  }

  let mut merged = concatenate(loaded);
  merged.save(output)?;
  info!("Merged {} documents into {}", report.merged.len(), output.display());
  report.output = Some(output.to_path_buf());
  Ok(report)
}

/// Number of pages in the PDF at `path`.
pub fn page_count(path: impl AsRef<Path>) -> Result<usize> {
  Ok(Document::load(path)?.get_pages().len())
}

/// Loads one input and checks it can contribute pages.
fn load_mergeable(path: &Path) -> Result<Document> {
  let document = Document::load(path)?;
  if document.is_encrypted() {
    return Err(GleanerError::InvalidArtifact("document is encrypted".into()));
  }
  if document.get_pages().is_empty() {
    return Err(GleanerError::InvalidArtifact("document has no pages".into()));
  }
  Ok(document)
}

/// Builds one document whose page tree lists every page of `documents` in order.
fn concatenate(documents: Vec<Document>) -> Document {
  let mut merged = Document::with_version("1.5");
  let mut max_id = 1;
  let mut page_ids: Vec<ObjectId> = Vec::new();

  for mut document in documents {
    flatten_inherited_attributes(&mut document);
    document.renumber_objects_with(max_id);
    max_id = document.max_id + 1;

    page_ids.extend(document.get_pages().into_values());
    for (id, object) in document.objects {
      // The old page trees and catalogs are replaced below.
      if !matches!(type_name(&object), Some(b"Pages") | Some(b"Catalog")) {
        merged.objects.insert(id, object);
      }
    }
  }

  let pages_id = (max_id, 0);
  let catalog_id = (max_id + 1, 0);
  for page_id in &page_ids {
    if let Ok(page) = merged.get_object_mut(*page_id).and_then(|o| o.as_dict_mut()) {
      page.set("Parent", pages_id);
    }
  }

  let kids: Vec<Object> = page_ids.iter().map(|id| Object::Reference(*id)).collect();
  merged.objects.insert(
    pages_id,
    Object::Dictionary(dictionary! {
      "Type" => "Pages",
      "Kids" => kids,
      "Count" => page_ids.len() as i64,
    }),
  );
  merged.objects.insert(
    catalog_id,
    Object::Dictionary(dictionary! {
      "Type" => "Catalog",
      "Pages" => pages_id,
    }),
  );
  merged.trailer.set("Root", catalog_id);
  merged.max_id = catalog_id.0;

  merged.prune_objects();
  merged.renumber_objects();
  merged.compress();
  merged
}

/// The `/Type` name of a dictionary object.
fn type_name(object: &Object) -> Option<&[u8]> {
  object.as_dict().ok()?.get(b"Type").and_then(Object::as_name).ok()
}

/// Copies inheritable attributes from ancestors onto every page that lacks them.
fn flatten_inherited_attributes(document: &mut Document) {
  for page_id in document.get_pages().into_values() {
    let inherited = inherited_attributes(document, page_id);
    if let Ok(page) = document.get_object_mut(page_id).and_then(|o| o.as_dict_mut()) {
      for (key, value) in inherited {
        if !page.has(&key) {
          page.set(key, value);
        }
      }
    }
  }
}

/// Inheritable attributes set on the ancestors of `page_id`; the nearest ancestor wins.
fn inherited_attributes(document: &Document, page_id: ObjectId) -> Vec<(Vec<u8>, Object)> {
  let parent_of = |id: ObjectId| {
    let node = document.get_dictionary(id).ok()?;
    node.get(b"Parent").and_then(Object::as_reference).ok()
  };

  let mut found: Vec<(Vec<u8>, Object)> = Vec::new();
  let mut visited = HashSet::new();
  let mut current = parent_of(page_id);
  while let Some(parent_id) = current {
    // Malformed files can contain cycles.
    if !visited.insert(parent_id) {
      break;
    }
    let Ok(parent) = document.get_dictionary(parent_id) else { break };
    for key in INHERITABLE_ATTRIBUTES {
      if found.iter().all(|(k, _)| k.as_slice() != key) {
        if let Ok(value) = parent.get(key) {
          found.push((key.to_vec(), value.clone()));
        }
      }
    }
    current = parent_of(parent_id);
  }
  found
}
