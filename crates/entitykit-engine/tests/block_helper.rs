use entitykit_engine::blocks::{
    BlockUpdate, ClonePosition, Position, RemoveTarget, clone_block, count_by_type, create_block,
    get_at_index, get_block_span, has_block, insert_block, parse_all, parse_blocks, remove_blocks,
    update_block,
};
use entitykit_engine::traverse::{PathSegment, Traverser};
use entitykit_syntax::{Attributes, serialize_blocks};
use insta::assert_snapshot;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

const POST: &str = r#"<!-- wp:heading {"level":1} -->
<h1 class="wp-block-heading">Release notes</h1>
<!-- /wp:heading -->

<!-- wp:group {"layout":{"type":"constrained"}} -->
<div class="wp-block-group"><!-- wp:paragraph -->
<p>Highlights</p>
<!-- /wp:paragraph -->

<!-- wp:list -->
<ul><!-- wp:list-item -->
<li>Faster</li>
<!-- /wp:list-item --></ul>
<!-- /wp:list --></div>
<!-- /wp:group -->

<!-- wp:separator /-->
"#;

#[rstest]
#[case("<!-- wp:paragraph --><p>Hello</p><!-- /wp:paragraph -->")]
#[case(r#"<!-- wp:heading {"level":3,"className":"is-style-x"} --><h3>T</h3><!-- /wp:heading -->"#)]
#[case("<!-- wp:group --><div><!-- wp:paragraph --><p>In</p><!-- /wp:paragraph --></div><!-- /wp:group -->")]
#[case("<!-- wp:separator /-->")]
#[case("<!-- wp:paragraph --><p>A</p><!-- /wp:paragraph --><!-- wp:paragraph --><p>B</p><!-- /wp:paragraph -->")]
fn serialize_of_parse_all_round_trips(#[case] document: &str) {
    assert_eq!(serialize_blocks(&parse_all(document)), document);
}

#[test]
fn parse_blocks_round_trips_whole_post() {
    // Given a post with whitespace between blocks
    let blocks = parse_blocks(POST);

    // Then the freeform runs are kept and serializing reproduces it
    assert_eq!(blocks.iter().filter(|b| !b.is_freeform()).count(), 3);
    assert_eq!(serialize_blocks(&blocks), POST);
}

#[test]
fn helper_queries_over_a_post() {
    assert!(has_block(POST, "list-item"));
    assert!(!has_block(POST, "image"));

    let top = count_by_type(POST, false);
    assert_eq!(top.types(), ["core/heading", "core/group", "core/separator"]);

    let nested = count_by_type(POST, true);
    assert_eq!(nested.total(), 6);

    let group = get_at_index(POST, 1, true).unwrap();
    assert_eq!(group.attrs["layout"], json!({"type": "constrained"}));
    assert_eq!(group.inner_blocks.len(), 2);

    let span = get_block_span(POST, 2).unwrap();
    assert_eq!(&POST[span.start..span.end], "<!-- wp:separator /-->");
}

#[test]
fn attributes_survive_a_round_trip() {
    let document =
        "<!-- wp:image {\"id\":42,\"sizeSlug\":\"large\",\"caption\":\"a \\u003cb\\u003e tag\"} /-->";
    let block = &parse_all(document)[0];
    assert_eq!(block.attrs["caption"], json!("a <b> tag"));
    assert_eq!(serialize_blocks(std::slice::from_ref(block)), document);
}

#[test]
fn editing_session_rewrites_post() {
    // Given a short post
    let mut blocks = parse_blocks(
        "<!-- wp:heading --><h2>Title</h2><!-- /wp:heading -->\n\n<!-- wp:paragraph --><p>Body</p><!-- /wp:paragraph -->",
    );

    // When a notice is inserted, the body updated, the heading cloned and the copy removed again
    let notice = create_block("paragraph", Attributes::new(), "Draft");
    insert_block(&mut blocks, notice, Position::Start).unwrap();
    update_block(
        &mut blocks,
        2,
        BlockUpdate {
            content: Some("<p>Edited</p>".to_string()),
            ..Default::default()
        },
    )
    .unwrap();
    let copy = clone_block(&mut blocks, 1, ClonePosition::End).unwrap();
    assert_eq!(copy, 3);
    let last = blocks.len() - 1;
    let removed = remove_blocks(&mut blocks, RemoveTarget::Indices(vec![last]));
    assert_eq!(removed, 1);

    // Then the serialized post reflects every edit
    assert_snapshot!(serialize_blocks(&blocks), @r"
    <!-- wp:paragraph --><p>Draft</p><!-- /wp:paragraph --><!-- wp:heading --><h2>Title</h2><!-- /wp:heading -->

    <!-- wp:paragraph --><p>Edited</p><!-- /wp:paragraph -->
    ");
}

#[test]
fn traverser_example_scenarios() {
    let mut data = json!({"foo": {"bar": "baz"}});
    let path = [PathSegment::from("foo"), PathSegment::from("bar")];

    let mut traverser = Traverser::new(&mut data);
    assert_eq!(traverser.get(&path).unwrap(), "baz");
    traverser.delete(&path).unwrap();

    assert_eq!(data, json!({"foo": {}}));
}
