//! Inserting an entity at the selection.

use crate::convert::entity::apply_entity_format;
use crate::dom::NodeId;
use crate::edit::delete_selection::delete_selection;
use crate::edit::paragraph::{append_caret_paragraph, split_paragraph};
use crate::editor::{EditorCore, FormatOptions};
use crate::error::{Error, Result};
use crate::model::{Block, Entity, EntityFormat, Segment};
use crate::plugin::ChangeSource;

/// Insert `wrapper` as a read-only entity, replacing the selection, or at
/// the end of the content when there is none.
///
/// The entity gets an id unique among the tracked entities, derived from
/// `entity_type`. A block entity splits the caret paragraph; the caret
/// ends up after the entity either way.
pub fn insert_entity(
    core: &mut EditorCore,
    wrapper: NodeId,
    entity_type: &str,
    is_block: bool,
) -> Result<Option<Entity>> {
    core.ensure_alive()?;
    if !core.dom().is_element(wrapper) {
        return Err(Error::NodeNotFound(wrapper));
    }
    let id = core.entity_map().unique_id(entity_type);
    let entity_format = EntityFormat {
        entity_type: Some(entity_type.to_string()),
        id: Some(id),
        is_readonly: true,
    };
    let dom = core.dom_mut();
    dom.detach(wrapper);
    apply_entity_format(dom, wrapper, &entity_format)?;
    let entity = Entity::new(wrapper, entity_format);
    let inserted = entity.clone();

    let options = FormatOptions::new("insertEntity").with_source(ChangeSource::InsertEntity);
    let changed = core.format_content_model(
        move |model, context| {
            let result = delete_selection(model, &[], Some(context));
            let point = match result.insert_point {
                Some(point) => point,
                None => append_caret_paragraph(model),
            };
            context.new_entities.push(entity.clone());

            if is_block {
                let Some(tail) = split_paragraph(model, &point.path, point.marker_index) else {
                    return false;
                };
                let Some(group) = tail.group_mut(&mut model.blocks) else {
                    return false;
                };
                group.insert(tail.index, Block::Entity(entity));
                let head_is_blank = group
                    .get(point.path.index)
                    .and_then(Block::as_paragraph)
                    .is_some_and(|head| head.segments.iter().all(Segment::is_br));
                if head_is_blank {
                    group.remove(point.path.index);
                }
            } else {
                let Some(paragraph) = model.paragraph_mut(&point.path) else {
                    return false;
                };
                let at = point.marker_index.min(paragraph.segments.len());
                paragraph.segments.insert(at, Segment::Entity(entity));
            }
            model.normalize();
            true
        },
        options,
    )?;
    tracing::debug!(entity_type, is_block, changed, "entity inserted");
    Ok(changed.then_some(inserted))
}
