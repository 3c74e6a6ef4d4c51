mod common;

use std::rc::Rc;

use common::{init_logger, BlockShaper, StubTexture};
use plume::prelude::*;

struct Scene {
    tree: VisualTree,
    root: NodeId,
    title: NodeId,
    icon: NodeId,
}

fn scene() -> Scene {
    let mut tree = VisualTree::new();
    let root = tree.insert(
        Visual::new(0)
            .style(Style::default().background(Color::WHITE).padding(Thickness::all(4.0)))
            .box_model(true)
            .layout(LayoutKind::vertical()),
    );
    let title = tree.insert(
        Visual::with_name("label#title")
            .unwrap()
            .style(Style::default().font_size(10.0))
            .geometry(Geometry::Text(TextGeometry::new("Hi")))
            .layout(LayoutKind::Entry),
    );
    let texture: Rc<dyn Texture> = Rc::new(StubTexture {
        id: 7,
        size: Size::new(16.0, 8.0),
    });
    let icon = tree.insert(
        Visual::new(2)
            .geometry(Geometry::Image(ImageGeometry::new(texture)))
            .layout(LayoutKind::Entry),
    );
    tree.append_child(root, title).unwrap();
    tree.append_child(root, icon).unwrap();
    Scene {
        tree,
        root,
        title,
        icon,
    }
}

#[test]
fn test_layout_render_and_batch_a_frame() {
    init_logger();
    let Scene {
        mut tree,
        root,
        title,
        icon,
    } = scene();
    let mut shaper = BlockShaper::default();
    let mut cache = ContentCache::new();

    tree.layout(root, &mut shaper).unwrap();
    assert_eq!(tree.get(root).unwrap().rect, Rect::new(0.0, 0.0, 24.0, 26.0));
    assert_eq!(tree.get(title).unwrap().rect, Rect::new(4.0, 4.0, 10.0, 10.0));
    assert_eq!(tree.get(icon).unwrap().rect, Rect::new(4.0, 14.0, 16.0, 8.0));

    let mut ctx = RenderContext::new(&mut shaper, &mut cache);
    tree.render(root, &mut ctx).unwrap();
    assert_eq!(ctx.stats.contents_rendered, 3);
    assert_eq!(ctx.stats.text_contexts_created, 1);

    let mut buffer = MeshBuffer::new();
    let list = buffer
        .build(&tree, root, Rect::new(0.0, 0.0, 100.0, 100.0))
        .unwrap();

    // Background first, under the root clip.
    let first = &list.draw_buffer.command_buffer[0];
    assert_eq!(first.clip_rect, Rect::new(0.0, 0.0, 100.0, 100.0));
    assert_eq!(first.elem_count, 6);

    // Children are clipped to the root's content box.
    let content_box = Rect::new(4.0, 4.0, 16.0, 18.0);
    assert!(!list.bezier_buffer.is_empty());
    assert!(list
        .bezier_buffer
        .command_buffer
        .iter()
        .all(|c| c.clip_rect == content_box));
    assert_eq!(list.image_buffer.command_buffer.len(), 1);
    let image = &list.image_buffer.command_buffer[0];
    assert_eq!(image.texture, Some(TextureId(7)));
    assert_eq!(image.clip_rect, content_box);
    assert_eq!(image.elem_count, 6);
}

#[test]
fn test_second_frame_only_touches_changed_visuals() {
    let Scene {
        mut tree,
        root,
        title,
        icon,
    } = scene();
    let mut shaper = BlockShaper::default();
    let mut cache = ContentCache::new();

    tree.layout(root, &mut shaper).unwrap();
    {
        let mut ctx = RenderContext::new(&mut shaper, &mut cache);
        tree.render(root, &mut ctx).unwrap();
    }
    let icon_mesh = tree.mesh(icon).unwrap().image.clone();

    tree.set_geometry(title, Some(Geometry::Text(TextGeometry::new("Hey"))))
        .unwrap();
    tree.layout(root, &mut shaper).unwrap();
    assert_eq!(tree.get(title).unwrap().rect, Rect::new(4.0, 4.0, 15.0, 10.0));
    // Wider title, same stack height: the icon does not move.
    assert!(!tree.get(icon).unwrap().is_content_dirty());

    let mut ctx = RenderContext::new(&mut shaper, &mut cache);
    tree.render(root, &mut ctx).unwrap();
    assert_eq!(ctx.stats.visuals_visited, 2);
    assert_eq!(ctx.stats.text_contexts_created, 1);
    assert_eq!(tree.mesh(icon).unwrap().image.indices, icon_mesh.indices);
    assert_eq!(shaper.shaped, 2);
    // The first shaping was released when the text changed.
    assert_eq!(shaper.live_contexts(), 1);
}

#[test]
fn test_inactive_and_clipped_visuals_are_not_batched() {
    let Scene {
        mut tree,
        root,
        title,
        icon,
    } = scene();
    let mut shaper = BlockShaper::default();
    let mut cache = ContentCache::new();
    tree.layout(root, &mut shaper).unwrap();
    {
        let mut ctx = RenderContext::new(&mut shaper, &mut cache);
        tree.render(root, &mut ctx).unwrap();
    }

    tree.set_active(icon, false).unwrap();
    let mut buffer = MeshBuffer::new();
    let list = buffer
        .build(&tree, root, Rect::new(0.0, 0.0, 100.0, 100.0))
        .unwrap();
    assert!(list.image_buffer.is_empty());
    assert!(!list.bezier_buffer.is_empty());

    // A window clip that ends above the title drops everything but the root.
    tree.set_active(icon, true).unwrap();
    let list = buffer.build(&tree, root, Rect::new(0.0, 0.0, 100.0, 4.0)).unwrap();
    assert!(list.bezier_buffer.is_empty());
    assert!(list.image_buffer.is_empty());
    assert_eq!(list.draw_buffer.command_buffer.len(), 1);

    tree.dispose(title).unwrap();
    assert!(!tree.contains(title));
    assert_eq!(tree.child_count(root), 1);
}

#[test]
fn test_recorded_drawing_replaces_geometry() {
    let Scene {
        mut tree,
        root,
        icon,
        ..
    } = scene();
    let mut shaper = BlockShaper::default();
    let mut cache = ContentCache::new();
    tree.layout(root, &mut shaper).unwrap();

    let mut dc = tree.render_open(icon).unwrap();
    dc.draw_rectangle(
        Some(&Brush::solid(Color::BLACK)),
        None,
        Rect::new(4.0, 14.0, 8.0, 8.0),
    );
    dc.close().unwrap();

    let mut ctx = RenderContext::new(&mut shaper, &mut cache);
    tree.render(root, &mut ctx).unwrap();
    let mesh = tree.mesh(icon).unwrap();
    assert!(mesh.image.is_empty());
    assert_eq!(mesh.shape.indices.len(), 6);
}

#[test]
fn test_disposing_a_subtree_evicts_its_cached_text() {
    let Scene {
        mut tree,
        root,
        title,
        ..
    } = scene();
    let mut shaper = BlockShaper::default();
    let mut cache = ContentCache::new();
    tree.layout(root, &mut shaper).unwrap();
    {
        let mut ctx = RenderContext::new(&mut shaper, &mut cache);
        tree.render(root, &mut ctx).unwrap();
    }
    let key = tree.get(title).unwrap().cache_key();
    assert!(cache.get(&key).is_some());
    assert_eq!(shaper.live_contexts(), 1);

    tree.dispose_with_content(root, &mut cache).unwrap();
    assert!(tree.is_empty());
    assert!(cache.is_empty());
    assert_eq!(shaper.live_contexts(), 0);
    assert!(matches!(
        tree.dispose_with_content(title, &mut cache),
        Err(Error::NodeNotFound(_))
    ));
}
