/// Replace the entry of `items` whose id matches `item`'s. Nothing is
/// inserted when no entry matches. Returns whether a replacement happened.
pub fn replace_by_id<T, F>(items: &mut im::Vector<T>, item: T, id: F) -> bool
where
    T: Clone,
    F: Fn(&T) -> Option<&str>,
{
    let Some(target) = id(&item).map(str::to_string) else {
        return false;
    };
    match items.iter().position(|e| id(e) == Some(target.as_str())) {
        Some(index) => {
            items.set(index, item);
            true
        }
        None => false,
    }
}

/// Replace `current` with `item` if both carry the same id
pub fn replace_if_same<T, F>(current: &mut Option<T>, item: &T, id: F) -> bool
where
    T: Clone,
    F: Fn(&T) -> Option<&str>,
{
    let same = match (current.as_ref().and_then(|c| id(c)), id(item)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    };
    if same {
        *current = Some(item.clone());
    }
    same
}

/// Drop every entry whose id is `target`. Returns how many were removed.
pub fn remove_by_id<T, F>(items: &mut im::Vector<T>, target: &str, id: F) -> usize
where
    T: Clone,
    F: Fn(&T) -> Option<&str>,
{
    let before = items.len();
    items.retain(|e| id(e) != Some(target));
    before - items.len()
}
