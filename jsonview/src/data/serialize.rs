use crate::data::{node::Node, value::Data};

/// Rebuild the data value of a subtree.
///
/// Containers start from their variant's empty container, so an empty list
/// stays a list and an ordered map stays ordered; children are added in
/// stored order. Leaves are re-typed by their variant. A container that
/// kept a value of the wrong shape writes that value back untouched.
pub fn serialize(node: &Node) -> Data {
    let Some(mut container) = node.variant.empty_container() else {
        return node.variant.to_data(&node.raw, &node.display);
    };
    if node.keeps_raw_value() {
        return node.raw.clone();
    }
    for child in &node.children {
        let value = serialize(child);
        match &mut container {
            Data::List(items) => items.push(value),
            Data::Map(m) | Data::OrderedMap(m) => {
                m.insert(child.key.segment().into_owned(), value);
            }
            _ => {}
        }
    }
    container
}
