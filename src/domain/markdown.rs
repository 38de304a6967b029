// ブロックツリーのMarkdownレンダリング
//
// ページ本文のネストしたブロック列をフラットなMarkdown文字列に変換する。
// 純粋関数であり、ブロックの取得（ページネーション・子ブロックの再帰取得）は
// インフラ層のContentStoreが担う。

use notion_client::objects::block::{Block, BlockType};
use notion_client::objects::file::File;
use notion_client::objects::rich_text::{Annotations, RichText};

use super::record::plain_text;

/// 子ブロックを解決済みのブロックノード
///
/// ContentStoreが`has_children`を辿って構築する。
#[derive(Debug, Clone)]
pub struct BlockNode {
    pub block: Block,
    pub children: Vec<BlockNode>,
}

impl BlockNode {
    /// 子を持たないノードを作成
    pub fn leaf(block: Block) -> Self {
        Self {
            block,
            children: Vec::new(),
        }
    }
}

/// ブロックツリーをMarkdown文字列に変換
///
/// トップレベルブロックは空行区切り、連続するリスト項目は
/// 1ブロックにまとめて改行区切りで出力する。
pub fn render_markdown(nodes: &[BlockNode]) -> String {
    render_siblings(nodes, 0).join("\n\n")
}

/// 兄弟ブロック列をブロック単位の文字列リストに変換
fn render_siblings(nodes: &[BlockNode], depth: usize) -> Vec<String> {
    let mut rendered = Vec::new();
    let mut list_run: Vec<String> = Vec::new();
    let mut numbered_index = 0usize;

    for node in nodes {
        if is_list_item(&node.block.block_type) {
            numbered_index = match node.block.block_type {
                BlockType::NumberedListItem { .. } => numbered_index + 1,
                _ => 0,
            };
            let item = render_node(node, depth, numbered_index);
            if !item.is_empty() {
                list_run.push(item);
            }
            continue;
        }

        // リスト項目の連続が途切れたら1ブロックとして確定
        if !list_run.is_empty() {
            rendered.push(list_run.join("\n"));
            list_run = Vec::new();
        }
        numbered_index = 0;

        let text = render_node(node, depth, 0);
        if !text.is_empty() {
            rendered.push(text);
        }
    }

    if !list_run.is_empty() {
        rendered.push(list_run.join("\n"));
    }

    rendered
}

/// リスト系ブロックか（連続時に同一ブロックへまとめる対象）
fn is_list_item(block_type: &BlockType) -> bool {
    matches!(
        block_type,
        BlockType::BulletedListItem { .. }
            | BlockType::NumberedListItem { .. }
            | BlockType::ToDo { .. }
            | BlockType::Toggle { .. }
    )
}

/// 単一ブロックをMarkdownに変換
///
/// `numbered_index`は連続する番号付きリスト内の1始まりの位置（リスト以外は0）。
fn render_node(node: &BlockNode, depth: usize, numbered_index: usize) -> String {
    let indent = "  ".repeat(depth);

    match &node.block.block_type {
        BlockType::Paragraph { paragraph } => {
            with_block_children(format!("{indent}{}", render_spans(&paragraph.rich_text)), node, depth)
        }
        BlockType::Heading1 { heading_1 } => {
            format!("{indent}# {}", render_spans(&heading_1.rich_text))
        }
        BlockType::Heading2 { heading_2 } => {
            format!("{indent}## {}", render_spans(&heading_2.rich_text))
        }
        BlockType::Heading3 { heading_3 } => {
            format!("{indent}### {}", render_spans(&heading_3.rich_text))
        }
        BlockType::BulletedListItem { bulleted_list_item } => with_list_children(
            format!("{indent}- {}", render_spans(&bulleted_list_item.rich_text)),
            node,
            depth,
        ),
        BlockType::NumberedListItem { numbered_list_item } => with_list_children(
            format!(
                "{indent}{numbered_index}. {}",
                render_spans(&numbered_list_item.rich_text)
            ),
            node,
            depth,
        ),
        BlockType::ToDo { to_do } => {
            let mark = if to_do.checked.unwrap_or(false) { "x" } else { " " };
            with_list_children(
                format!("{indent}- [{mark}] {}", render_spans(&to_do.rich_text)),
                node,
                depth,
            )
        }
        BlockType::Toggle { toggle } => with_list_children(
            format!("{indent}- {}", render_spans(&toggle.rich_text)),
            node,
            depth,
        ),
        BlockType::Quote { quote } => format!("{indent}> {}", render_spans(&quote.rich_text)),
        BlockType::Callout { callout } => format!("{indent}> {}", render_spans(&callout.rich_text)),
        BlockType::Code { code } => {
            let language = format!("{:?}", code.language).to_lowercase();
            format!(
                "{indent}```{language}\n{}\n{indent}```",
                plain_text(&code.rich_text)
            )
        }
        BlockType::Equation { equation } => format!("{indent}$$\n{}\n{indent}$$", equation.expression),
        BlockType::Divider { .. } => format!("{indent}---"),
        BlockType::Bookmark { bookmark } => {
            let caption = plain_text(&bookmark.caption);
            let label = if caption.is_empty() { &bookmark.url } else { &caption };
            format!("{indent}[{label}]({})", bookmark.url)
        }
        BlockType::Embed { embed } => format!("{indent}<{}>", embed.url),
        BlockType::LinkPreview { link_preview } => format!("{indent}<{}>", link_preview.url),
        BlockType::Image { image } => format!("{indent}![image]({})", file_object_url(&image.file_type)),
        BlockType::Video { video } => format!("{indent}[video]({})", file_object_url(&video.file_type)),
        BlockType::File { file } => format!("{indent}[file]({})", file_object_url(&file.file_type)),
        BlockType::Pdf { pdf } => format!("{indent}[pdf]({})", file_object_url(&pdf.file_type)),
        BlockType::ChildPage { child_page } => format!("{indent}**{}**", child_page.title),
        BlockType::ChildDatabase { child_database } => {
            format!("{indent}**{}**", child_database.title)
        }
        BlockType::TableRow { table_row } => {
            let cells: Vec<String> = table_row.cells.iter().map(|c| render_spans(c)).collect();
            format!("{indent}| {} |", cells.join(" | "))
        }
        // テーブル本体・カラムレイアウトは子ブロックの内容のみ出力
        BlockType::Table { .. } | BlockType::ColumnList { .. } | BlockType::Column { .. } => {
            render_siblings(&node.children, depth).join("\n")
        }
        // 対応しないブロックは本文から除外
        _ => String::new(),
    }
}

/// 非リストブロックの子を空行区切りで続ける
fn with_block_children(text: String, node: &BlockNode, depth: usize) -> String {
    if node.children.is_empty() {
        return text;
    }
    let children = render_siblings(&node.children, depth);
    if children.is_empty() {
        return text;
    }
    format!("{text}\n\n{}", children.join("\n\n"))
}

/// リスト項目の子をインデントして改行区切りで続ける
fn with_list_children(text: String, node: &BlockNode, depth: usize) -> String {
    if node.children.is_empty() {
        return text;
    }
    let children = render_siblings(&node.children, depth + 1);
    if children.is_empty() {
        return text;
    }
    format!("{text}\n{}", children.join("\n"))
}

/// リッチテキスト列をインライン装飾付きで変換
fn render_spans(spans: &[RichText]) -> String {
    spans.iter().map(render_span).collect()
}

fn render_span(span: &RichText) -> String {
    match span {
        RichText::Text {
            text,
            annotations,
            plain_text,
            href,
        } => {
            let content = plain_text.clone().unwrap_or_else(|| text.content.clone());
            let decorated = apply_annotations(content, annotations.as_ref());
            let link = text
                .link
                .as_ref()
                .map(|l| l.url.clone())
                .or_else(|| href.clone());
            match link {
                Some(url) => format!("[{decorated}]({url})"),
                None => decorated,
            }
        }
        RichText::Mention {
            plain_text, href, ..
        } => match href {
            Some(url) => format!("[{plain_text}]({url})"),
            None => plain_text.clone(),
        },
        RichText::Equation { equation, .. } => format!("${}$", equation.expression),
        _ => String::new(),
    }
}

/// インライン装飾を適用
///
/// 空白のみのスパンは装飾しない（`** **`のような壊れたMarkdownを防ぐ）。
fn apply_annotations(content: String, annotations: Option<&Annotations>) -> String {
    let Some(annotations) = annotations else {
        return content;
    };
    if content.trim().is_empty() {
        return content;
    }

    let mut decorated = content;
    if annotations.code {
        decorated = format!("`{decorated}`");
    }
    if annotations.bold {
        decorated = format!("**{decorated}**");
    }
    if annotations.italic {
        decorated = format!("*{decorated}*");
    }
    if annotations.strikethrough {
        decorated = format!("~~{decorated}~~");
    }
    decorated
}

fn file_object_url(file: &File) -> String {
    match file {
        File::External { external } => external.url.clone(),
        File::File { file } => file.url.clone(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::{Value, json};

    /// テスト用ブロックを組み立てる
    pub(crate) fn block(block_type: &str, payload: Value) -> Block {
        block_with_children_flag(block_type, payload, false)
    }

    pub(crate) fn block_with_children_flag(
        block_type: &str,
        payload: Value,
        has_children: bool,
    ) -> Block {
        let value = json!({
            "object": "block",
            "id": "0c940de1-7e02-4fc1-91d9-e62a0b2a6b62",
            "parent": { "type": "page_id", "page_id": "59833787-2cf9-4fdf-8782-e53db20768a5" },
            "created_time": "2024-03-01T19:10:00.000Z",
            "last_edited_time": "2024-03-01T19:10:00.000Z",
            "created_by": { "object": "user", "id": "c2f20311-9e54-4d11-8c79-7398424ae41e" },
            "last_edited_by": { "object": "user", "id": "c2f20311-9e54-4d11-8c79-7398424ae41e" },
            "has_children": has_children,
            "archived": false,
            "type": block_type,
            block_type: payload
        });
        serde_json::from_value(value).expect("テストブロックのデシリアライズに失敗")
    }

    pub(crate) fn text_span(content: &str) -> Value {
        annotated_span(content, json!({
            "bold": false,
            "italic": false,
            "strikethrough": false,
            "underline": false,
            "code": false,
            "color": "default"
        }))
    }

    fn annotated_span(content: &str, annotations: Value) -> Value {
        json!({
            "type": "text",
            "text": { "content": content, "link": null },
            "annotations": annotations,
            "plain_text": content,
            "href": null
        })
    }

    fn paragraph(content: &str) -> BlockNode {
        BlockNode::leaf(block(
            "paragraph",
            json!({ "rich_text": [text_span(content)], "color": "default" }),
        ))
    }

    #[test]
    fn test_paragraphs_are_separated_by_blank_lines() {
        let nodes = vec![paragraph("一段落目"), paragraph("二段落目")];

        assert_eq!(render_markdown(&nodes), "一段落目\n\n二段落目");
    }

    #[test]
    fn test_headings() {
        let nodes = vec![
            BlockNode::leaf(block(
                "heading_1",
                json!({ "rich_text": [text_span("見出し")], "color": "default", "is_toggleable": false }),
            )),
            BlockNode::leaf(block(
                "heading_2",
                json!({ "rich_text": [text_span("小見出し")], "color": "default", "is_toggleable": false }),
            )),
        ];

        assert_eq!(render_markdown(&nodes), "# 見出し\n\n## 小見出し");
    }

    #[test]
    fn test_bulleted_list_run_is_single_block() {
        let nodes = vec![
            BlockNode::leaf(block(
                "bulleted_list_item",
                json!({ "rich_text": [text_span("りんご")], "color": "default" }),
            )),
            BlockNode::leaf(block(
                "bulleted_list_item",
                json!({ "rich_text": [text_span("みかん")], "color": "default" }),
            )),
        ];

        assert_eq!(render_markdown(&nodes), "- りんご\n- みかん");
    }

    #[test]
    fn test_numbered_list_is_sequenced_per_run() {
        let nodes = vec![
            BlockNode::leaf(block(
                "numbered_list_item",
                json!({ "rich_text": [text_span("手順1")], "color": "default" }),
            )),
            BlockNode::leaf(block(
                "numbered_list_item",
                json!({ "rich_text": [text_span("手順2")], "color": "default" }),
            )),
            paragraph("区切り"),
            BlockNode::leaf(block(
                "numbered_list_item",
                json!({ "rich_text": [text_span("別の手順")], "color": "default" }),
            )),
        ];

        assert_eq!(
            render_markdown(&nodes),
            "1. 手順1\n2. 手順2\n\n区切り\n\n1. 別の手順"
        );
    }

    #[test]
    fn test_nested_list_is_indented() {
        let child = BlockNode::leaf(block(
            "bulleted_list_item",
            json!({ "rich_text": [text_span("子")], "color": "default" }),
        ));
        let parent = BlockNode {
            block: block_with_children_flag(
                "bulleted_list_item",
                json!({ "rich_text": [text_span("親")], "color": "default" }),
                true,
            ),
            children: vec![child],
        };

        assert_eq!(render_markdown(&[parent]), "- 親\n  - 子");
    }

    #[test]
    fn test_todo_checkbox_states() {
        let nodes = vec![
            BlockNode::leaf(block(
                "to_do",
                json!({ "rich_text": [text_span("完了済み")], "checked": true, "color": "default" }),
            )),
            BlockNode::leaf(block(
                "to_do",
                json!({ "rich_text": [text_span("未完了")], "checked": false, "color": "default" }),
            )),
        ];

        assert_eq!(render_markdown(&nodes), "- [x] 完了済み\n- [ ] 未完了");
    }

    #[test]
    fn test_code_block_is_fenced_with_language() {
        let nodes = vec![BlockNode::leaf(block(
            "code",
            json!({
                "rich_text": [text_span("fn main() {}")],
                "language": "rust",
                "caption": []
            }),
        ))];

        assert_eq!(render_markdown(&nodes), "```rust\nfn main() {}\n```");
    }

    #[test]
    fn test_quote_and_divider() {
        let nodes = vec![
            BlockNode::leaf(block(
                "quote",
                json!({ "rich_text": [text_span("引用文")], "color": "default" }),
            )),
            BlockNode::leaf(block("divider", json!({}))),
        ];

        assert_eq!(render_markdown(&nodes), "> 引用文\n\n---");
    }

    #[test]
    fn test_image_renders_as_markdown_image() {
        let nodes = vec![BlockNode::leaf(block(
            "image",
            json!({ "type": "external", "external": { "url": "https://example.com/a.png" } }),
        ))];

        assert_eq!(render_markdown(&nodes), "![image](https://example.com/a.png)");
    }

    #[test]
    fn test_inline_annotations() {
        let nodes = vec![BlockNode::leaf(block(
            "paragraph",
            json!({
                "rich_text": [
                    annotated_span("強調", json!({
                        "bold": true, "italic": false, "strikethrough": false,
                        "underline": false, "code": false, "color": "default"
                    })),
                    text_span("と"),
                    annotated_span("code", json!({
                        "bold": false, "italic": false, "strikethrough": false,
                        "underline": false, "code": true, "color": "default"
                    }))
                ],
                "color": "default"
            }),
        ))];

        assert_eq!(render_markdown(&nodes), "**強調**と`code`");
    }

    #[test]
    fn test_inline_link() {
        let span = json!({
            "type": "text",
            "text": { "content": "リンク", "link": { "url": "https://example.com" } },
            "annotations": {
                "bold": false, "italic": false, "strikethrough": false,
                "underline": false, "code": false, "color": "default"
            },
            "plain_text": "リンク",
            "href": "https://example.com"
        });
        let nodes = vec![BlockNode::leaf(block(
            "paragraph",
            json!({ "rich_text": [span], "color": "default" }),
        ))];

        assert_eq!(render_markdown(&nodes), "[リンク](https://example.com)");
    }

    #[test]
    fn test_empty_paragraph_is_skipped() {
        let nodes = vec![
            paragraph("前"),
            BlockNode::leaf(block(
                "paragraph",
                json!({ "rich_text": [], "color": "default" }),
            )),
            paragraph("後"),
        ];

        assert_eq!(render_markdown(&nodes), "前\n\n後");
    }

    #[test]
    fn test_empty_tree_renders_empty_string() {
        assert_eq!(render_markdown(&[]), "");
    }
}
