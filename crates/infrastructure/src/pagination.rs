use domain::{SortOrder, Todo, TodoPage};

/// ストアが返した順序（ソート前）の最後の行のIDを次のカーソルにする
pub fn next_cursor(raw: &[Todo]) -> String {
    raw.last()
        .map(|todo| todo.id.as_str().to_string())
        .unwrap_or_default()
}

/// `created_at` で安定ソート。件数は変えない
pub fn sort_page(todos: &mut [Todo], sort_order: SortOrder) {
    match sort_order {
        SortOrder::Ascending => todos.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortOrder::Descending => todos.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
}

/// 生の取得結果からページを組み立てる
///
/// カーソルはソート前に確定するため、表示順を変えても
/// 「取得済み」とみなす範囲は変わらない。
pub fn build_page(raw: Vec<Todo>, sort_order: SortOrder) -> TodoPage {
    let next_cursor = next_cursor(&raw);
    let mut todos = raw;
    sort_page(&mut todos, sort_order);
    TodoPage { todos, next_cursor }
}
