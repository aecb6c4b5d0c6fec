//! Document-level access control.

use examprep_core::types::{AccessRecord, Document};

/// Whether `student_id` may read `document`.
///
/// Public documents are open to everyone. Group and private documents need a
/// grant naming both the student and the document. A stored visibility
/// outside the known set is treated as closed.
pub fn can_access(document: &Document, student_id: &str, records: &[AccessRecord]) -> bool {
    match document.visibility() {
        Some(visibility) if !visibility.is_restricted() => true,
        Some(_) => records
            .iter()
            .any(|r| r.student_id == student_id && r.document_id == document.id),
        None => false,
    }
}

/// Keep only the documents the student may read, preserving order.
pub fn filter_accessible(
    documents: Vec<Document>,
    student_id: &str,
    records: &[AccessRecord],
) -> Vec<Document> {
    documents
        .into_iter()
        .filter(|doc| can_access(doc, student_id, records))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn doc(id: i64, visibility: &str) -> Document {
        Document {
            id,
            trainer_id: "t1".into(),
            file_name: "f.txt".into(),
            file_type: "txt".into(),
            file_url: "/uploads/documents/f.txt".into(),
            file_size: None,
            subject: None,
            topic: None,
            description: None,
            visibility_raw: visibility.into(),
            access_groups: vec![],
            uploaded_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn grant(document_id: i64, student_id: &str) -> AccessRecord {
        AccessRecord {
            id: 1,
            document_id,
            student_id: student_id.into(),
            access_level: "view".into(),
            granted_at: Utc::now(),
            granted_by: None,
        }
    }

    #[test]
    fn test_public_needs_no_records() {
        assert!(can_access(&doc(1, "public"), "s1", &[]));
    }

    #[test]
    fn test_private_requires_matching_grant() {
        let d = doc(1, "private");
        assert!(!can_access(&d, "s1", &[]));
        assert!(!can_access(&d, "s1", &[grant(2, "s1")]));
        assert!(!can_access(&d, "s1", &[grant(1, "s2")]));
        assert!(can_access(&d, "s1", &[grant(1, "s1")]));
    }

    #[test]
    fn test_group_matches_private() {
        let d = doc(3, "group");
        assert!(!can_access(&d, "s1", &[]));
        assert!(can_access(&d, "s1", &[grant(3, "s1")]));
    }

    #[test]
    fn test_unknown_visibility_fails_closed() {
        let d = doc(4, "secret");
        assert!(!can_access(&d, "s1", &[grant(4, "s1")]));
    }

    #[test]
    fn test_filter_preserves_order() {
        let docs = vec![doc(1, "public"), doc(2, "private"), doc(3, "public")];
        let ids: Vec<i64> = filter_accessible(docs, "s1", &[])
            .iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }
}
