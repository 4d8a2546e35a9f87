use crate::content::TextItem;

/// Round half up, so -60.5 becomes -60 and 60.5 becomes 61
fn round_half_up(v: f64) -> i64 {
    (v + 0.5).floor() as i64
}

/// Reading-order key: page, then whole-unit Y, then whole-unit X of the
/// item's anchor point
pub fn reading_order_key(item: &TextItem) -> (usize, i64, i64) {
    let anchor = item.anchor();
    (item.page, round_half_up(anchor.y), round_half_up(anchor.x))
}

/// Stable sort into reading order. Items whose rounded coordinates tie
/// keep their stream order.
pub fn sort_items(items: &mut [TextItem]) {
    items.sort_by_key(reading_order_key);
}
