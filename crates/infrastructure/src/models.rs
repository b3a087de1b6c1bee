use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Utc};
use domain::{Todo, TodoError, TodoId};
use std::collections::HashMap;

/// テーブルの属性名
pub mod attributes {
    pub const ID: &str = "id";
    pub const USER_ID: &str = "user_id";
    pub const TITLE: &str = "title";
    pub const DESCRIPTION: &str = "description";
    pub const STATUS: &str = "status";
    pub const CREATED: &str = "created";
    pub const UPDATED: &str = "updated";
}

pub type Item = HashMap<String, AttributeValue>;

/// ToDoを全属性そろったアイテムに変換（部分更新は行わない）
pub fn todo_to_item(todo: &Todo) -> Item {
    let mut item = HashMap::new();
    item.insert(
        attributes::ID.to_string(),
        AttributeValue::S(todo.id.as_str().to_string()),
    );
    item.insert(
        attributes::USER_ID.to_string(),
        AttributeValue::S(todo.user_id.clone()),
    );
    item.insert(
        attributes::TITLE.to_string(),
        AttributeValue::S(todo.title.clone()),
    );
    item.insert(
        attributes::DESCRIPTION.to_string(),
        AttributeValue::S(todo.description.clone()),
    );
    item.insert(
        attributes::STATUS.to_string(),
        AttributeValue::S(todo.status.clone()),
    );
    item.insert(
        attributes::CREATED.to_string(),
        AttributeValue::S(todo.created_at.to_rfc3339()),
    );
    item.insert(
        attributes::UPDATED.to_string(),
        AttributeValue::S(todo.updated_at.to_rfc3339()),
    );
    item
}

pub fn item_to_todo(item: &Item) -> Result<Todo, TodoError> {
    Ok(Todo {
        id: TodoId::from_string(string_attribute(item, attributes::ID)?),
        user_id: string_attribute(item, attributes::USER_ID)?,
        title: string_attribute(item, attributes::TITLE)?,
        description: string_attribute(item, attributes::DESCRIPTION)?,
        status: string_attribute(item, attributes::STATUS)?,
        created_at: timestamp_attribute(item, attributes::CREATED)?,
        updated_at: timestamp_attribute(item, attributes::UPDATED)?,
    })
}

/// キーのみを射影したアイテムからIDを取り出す
pub fn item_id(item: &Item) -> Result<String, TodoError> {
    string_attribute(item, attributes::ID)
}

fn string_attribute(item: &Item, name: &str) -> Result<String, TodoError> {
    item.get(name)
        .and_then(|value| value.as_s().ok())
        .cloned()
        .ok_or_else(|| TodoError::Decode(format!("missing string attribute `{name}`")))
}

fn timestamp_attribute(item: &Item, name: &str) -> Result<DateTime<Utc>, TodoError> {
    let raw = string_attribute(item, name)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|e| TodoError::Decode(format!("attribute `{name}` is not RFC 3339 ({raw}): {e}")))
}
