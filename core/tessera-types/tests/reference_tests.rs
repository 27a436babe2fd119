use proptest::prelude::*;
use tessera_types::{ContentTypeId, Error, ItemId, ItemRef};

fn item_ref(ct: &str, id: &str) -> ItemRef {
    ItemRef::new(ContentTypeId::parse(ct).unwrap(), ItemId::parse(id).unwrap())
}

// ── Encoding ─────────────────────────────────────────────────────

#[test]
fn display_uses_space_separated_encoding() {
    assert_eq!(item_ref("authors", "abc123").to_string(), "authors abc123");
}

#[test]
fn parse_splits_at_first_space() {
    let r = ItemRef::parse("authors abc 123").unwrap();
    assert_eq!(r.content_type().as_str(), "authors");
    assert_eq!(r.item().as_str(), "abc 123");
}

#[test]
fn parse_rejects_missing_separator() {
    assert_eq!(
        ItemRef::parse("authors"),
        Err(Error::InvalidReference("authors".into()))
    );
}

#[test]
fn parse_rejects_empty_halves() {
    assert!(ItemRef::parse(" abc").is_err());
    assert!(ItemRef::parse("authors ").is_err());
}

#[test]
fn serde_uses_string_form() {
    let r = item_ref("posts", "p1");
    let json = serde_json::to_string(&r).unwrap();
    assert_eq!(json, r#""posts p1""#);
    let back: ItemRef = serde_json::from_str(&json).unwrap();
    assert_eq!(back, r);
}

#[test]
fn serde_rejects_malformed_reference() {
    let bad: Result<ItemRef, _> = serde_json::from_str(r#""nospace""#);
    assert!(bad.is_err());
}

#[test]
fn refs_with_same_item_id_in_different_types_differ() {
    assert_ne!(item_ref("posts", "1"), item_ref("pages", "1"));
}

// ── Properties ───────────────────────────────────────────────────

proptest! {
    /// Any valid pair survives display → parse unchanged.
    #[test]
    fn display_then_parse_is_identity(
        ct in "[a-z][a-z0-9_-]{0,20}",
        id in "[A-Za-z0-9_ -]{1,30}",
    ) {
        prop_assume!(!id.is_empty());
        let r = item_ref(&ct, &id);
        prop_assert_eq!(ItemRef::parse(&r.to_string()).unwrap(), r);
    }
}
