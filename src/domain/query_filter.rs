// Notionデータベースクエリの複合フィルター構築
//
// リストエンドポイントは常にStatus=Publishedを条件に含み、
// 任意のカテゴリ・タグ条件をANDで合成する。フィルター適用は
// Notion側で行われるため、ここでは条件オブジェクトの構築のみを担う。

use serde_json::{Value, json};

/// リストエンドポイント用の複合フィルターを構築
///
/// `{Status = Published} AND (Category = c)? AND (Tags contains t)?`
///
/// # 引数
/// * `category` - カテゴリ完全一致条件（任意）
/// * `tag` - タグ包含条件（任意、ブログのみ使用）
///
/// # 戻り値
/// Notionクエリボディの`filter`値
pub fn published_filter(category: Option<&str>, tag: Option<&str>) -> Value {
    let mut conditions = vec![json!({
        "property": "Status",
        "status": { "equals": "Published" }
    })];

    if let Some(category) = category {
        conditions.push(json!({
            "property": "Category",
            "select": { "equals": category }
        }));
    }

    if let Some(tag) = tag {
        conditions.push(json!({
            "property": "Tags",
            "multi_select": { "contains": tag }
        }));
    }

    // 条件がひとつならandで包まずそのまま返す
    match conditions.len() {
        1 => conditions.swap_remove(0),
        _ => json!({ "and": conditions }),
    }
}
