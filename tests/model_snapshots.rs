//! Snapshot tests for the serialized Content Model.

use contentmodel_rust::edit::{InsertPoint, merge_model};
use contentmodel_rust::{Block, BlockPath, ContentModelDocument, Paragraph, Segment, SegmentFormat};

fn paragraph(texts: &[&str]) -> Block {
    Block::Paragraph(Paragraph::with_segments(
        texts
            .iter()
            .map(|text| Segment::text(text, SegmentFormat::default()))
            .collect(),
    ))
}

#[test]
fn test_paste_of_two_paragraphs_splits_caret_paragraph() {
    let mut model = ContentModelDocument::with_blocks(vec![Block::Paragraph(
        Paragraph::with_segments(vec![
            Segment::text("ab", SegmentFormat::default()),
            Segment::marker(SegmentFormat::default()),
            Segment::text("cd", SegmentFormat::default()),
        ]),
    )]);
    let point = InsertPoint {
        path: BlockPath::root(0),
        marker_index: 1,
    };
    merge_model(&mut model, &point, vec![paragraph(&["1"]), paragraph(&["2"])]);

    insta::assert_json_snapshot!(model, @r###"
    {
      "blocks": [
        {
          "blockType": "Paragraph",
          "segments": [
            {
              "segmentType": "Text",
              "text": "ab",
              "format": {},
              "isSelected": false
            },
            {
              "segmentType": "Text",
              "text": "1",
              "format": {},
              "isSelected": false
            }
          ],
          "format": {},
          "isImplicit": false
        },
        {
          "blockType": "Paragraph",
          "segments": [
            {
              "segmentType": "Text",
              "text": "2",
              "format": {},
              "isSelected": false
            },
            {
              "segmentType": "SelectionMarker",
              "format": {},
              "isSelected": true
            },
            {
              "segmentType": "Text",
              "text": "cd",
              "format": {},
              "isSelected": false
            }
          ],
          "format": {},
          "isImplicit": false
        }
      ],
      "hasRevertedRangeSelection": false
    }
    "###);
}

#[test]
fn test_model_json_round_trips_through_serde() {
    let model = ContentModelDocument::with_blocks(vec![paragraph(&["hello", " world"])]);
    let json = model.to_json().unwrap();
    assert!(json.contains("\"blockType\":\"Paragraph\""));
    assert_eq!(ContentModelDocument::from_json(&json).unwrap(), model);
}
