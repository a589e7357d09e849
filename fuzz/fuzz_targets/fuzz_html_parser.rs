//! Fuzz target for the HTML fragment parser and both model converters.
//!
//! Arbitrary markup must parse, convert to a model and write back without
//! panicking, and delimiter reconciliation must settle after one pass.

#![no_main]

use contentmodel_rust::Dom;
use contentmodel_rust::convert::{self, ModelToDomOptions};
use contentmodel_rust::edit::reconcile_delimiters;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|source: &str| {
    let mut dom = Dom::new();
    let root = dom.create_element("div");
    if dom.set_attribute(root, "contenteditable", "true").is_err() {
        return;
    }
    if dom.set_inner_html(root, source).is_err() {
        return;
    }

    let model = convert::create_content_model(&dom, root, None, None);
    let _ = model.plain_text();
    if convert::set_content_model(&mut dom, root, &model, &ModelToDomOptions::default(), None).is_err() {
        return;
    }
    let _ = dom.inner_html(root);

    if reconcile_delimiters(&mut dom, root, true).is_ok() {
        let settled = reconcile_delimiters(&mut dom, root, true);
        assert!(matches!(settled, Ok(false)), "reconciliation did not settle");
    }
});
