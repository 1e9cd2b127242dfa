//! The children reconciler: sequence/text/absent transitions (spec §4.3)
//! and the keyed "fast diff" (spec §4.4).

use crate::adapter::HostAdapter;
use crate::lis::longest_increasing_subsequence;
use crate::patch::patch;
use crate::unmount::unmount;
use crate::vnode::{Children, Key, NodeKind, VNode};
use fxhash::FxHashMap;
use smallvec::SmallVec;
use std::rc::Rc;

/// Dispatches on the shape of `old`/`new` children (spec §4.3).
pub fn reconcile_children<N, A>(
    old: &Children<N>,
    new: &Children<N>,
    container: &N,
    anchor: Option<&N>,
    adapter: &Rc<A>,
) where
    N: Clone + 'static,
    A: HostAdapter<N> + 'static,
{
    match new {
        Children::Nodes(new_nodes) => match old {
            Children::Nodes(old_nodes) => diff_keyed_children(old_nodes, new_nodes, container, anchor, adapter),
            Children::Text(_) => {
                adapter.set_element_text(container, "");
                mount_nodes(new_nodes, container, anchor, adapter);
            }
            Children::None | Children::Slots(_) => mount_nodes(new_nodes, container, anchor, adapter),
        },
        Children::Text(text) => {
            match old {
                Children::Nodes(old_nodes) => {
                    for node in old_nodes {
                        unmount(node, container, adapter);
                    }
                    adapter.set_element_text(container, text);
                }
                Children::Text(old_text) if old_text == text => {}
                Children::Text(_) | Children::None | Children::Slots(_) => {
                    adapter.set_element_text(container, text);
                }
            }
        }
        Children::None => match old {
            Children::Nodes(old_nodes) => {
                for node in old_nodes {
                    unmount(node, container, adapter);
                }
            }
            Children::Text(old_text) if old_text.is_empty() => {}
            Children::Text(_) => adapter.set_element_text(container, ""),
            Children::None | Children::Slots(_) => {}
        },
        // Component children (slot maps) are not reconciled as host
        // children; a component vnode's own mount/patch path handles them.
        Children::Slots(_) => {}
    }
}

fn mount_nodes<N, A>(nodes: &[VNode<N>], container: &N, outer_anchor: Option<&N>, adapter: &Rc<A>)
where
    N: Clone + 'static,
    A: HostAdapter<N> + 'static,
{
    for (idx, node) in nodes.iter().enumerate() {
        let child_anchor = anchor_for(nodes, idx + 1, outer_anchor);
        patch(None, node, container, child_anchor.as_ref(), adapter);
    }
}

fn anchor_for<N: Clone>(nodes: &[VNode<N>], from: usize, fallback: Option<&N>) -> Option<N> {
    nodes[from..]
        .iter()
        .find_map(|n| n.first_host_node())
        .or_else(|| fallback.cloned())
}

/// Moves every host node produced by `vnode`'s subtree before `anchor`,
/// preserving order. Reuses `insert`, which is a move when the node
/// already has a parent - the same assumption the teacher's DOM-facing
/// mutation stream makes.
fn move_vnode<N, A>(vnode: &VNode<N>, container: &N, anchor: Option<&N>, adapter: &Rc<A>)
where
    N: Clone + 'static,
    A: HostAdapter<N> + 'static,
{
    match &vnode.kind {
        NodeKind::Element(_) | NodeKind::Text | NodeKind::Comment => {
            if let Some(el) = vnode.el() {
                adapter.insert(&el, container, anchor);
            }
        }
        NodeKind::Fragment => {
            if let Some(nodes) = vnode.children.as_nodes() {
                for child in nodes {
                    move_vnode(child, container, anchor, adapter);
                }
            }
        }
        NodeKind::Component(_) => {
            if let Some(instance) = vnode.component_instance() {
                let inst = instance.borrow();
                if let Some(tree) = inst.sub_tree() {
                    move_vnode(&tree, container, anchor, adapter);
                }
            }
        }
    }
}

/// The keyed fast-diff (spec §4.4).
fn diff_keyed_children<N, A>(
    old: &[VNode<N>],
    new: &[VNode<N>],
    container: &N,
    outer_anchor: Option<&N>,
    adapter: &Rc<A>,
) where
    N: Clone + 'static,
    A: HostAdapter<N> + 'static,
{
    let m = old.len();
    let n = new.len();
    let mut i = 0usize;

    // Phase 1: common prefix.
    while i < m && i < n && old[i].key() == new[i].key() {
        patch(Some(&old[i]), &new[i], container, None, adapter);
        i += 1;
    }

    // Phase 2: common suffix.
    let mut old_end = m as isize - 1;
    let mut new_end = n as isize - 1;
    while old_end >= i as isize
        && new_end >= i as isize
        && old[old_end as usize].key() == new[new_end as usize].key()
    {
        patch(Some(&old[old_end as usize]), &new[new_end as usize], container, None, adapter);
        old_end -= 1;
        new_end -= 1;
    }

    if i as isize > old_end && i as isize <= new_end {
        // Phase 3a: pure mount of the remaining new tail.
        for x in i..=(new_end as usize) {
            let child_anchor = anchor_for(new, x + 1, outer_anchor);
            patch(None, &new[x], container, child_anchor.as_ref(), adapter);
        }
        return;
    }

    if i as isize > new_end && i as isize <= old_end {
        // Phase 3b: pure unmount of the remaining old tail.
        for x in i..=(old_end as usize) {
            unmount(&old[x], container, adapter);
        }
        return;
    }

    if i as isize > old_end && i as isize > new_end {
        // Nothing left in either list.
        return;
    }

    // Phase 4: general middle.
    let start = i;
    let to_patch = (new_end - i as isize + 1) as usize;
    let mut source: SmallVec<[isize; 8]> = SmallVec::from_elem(-1, to_patch);

    let mut key_to_new_index: FxHashMap<Key, usize> = FxHashMap::default();
    for k in start..=(new_end as usize) {
        if let Some(key) = new[k].key() {
            key_to_new_index.insert(key.clone(), k);
        }
    }

    let mut patched = 0usize;
    let mut moved = false;
    let mut pos = 0usize;

    for j in start..=(old_end as usize) {
        if patched >= to_patch {
            unmount(&old[j], container, adapter);
            continue;
        }
        let matched = old[j].key().and_then(|key| key_to_new_index.get(key).copied());
        match matched {
            Some(k) => {
                patch(Some(&old[j]), &new[k], container, None, adapter);
                source[k - start] = j as isize;
                if k < pos {
                    moved = true;
                } else {
                    pos = k;
                }
                patched += 1;
            }
            None => unmount(&old[j], container, adapter),
        }
    }

    let seq: Vec<usize> = if moved {
        longest_increasing_subsequence(&source)
    } else {
        (0..to_patch).filter(|&x| source[x] != -1).collect()
    };
    let mut seq_cursor = seq.len() as isize - 1;

    for x in (0..to_patch).rev() {
        let new_index = start + x;
        let anchor = anchor_for(new, new_index + 1, outer_anchor);

        if source[x] == -1 {
            patch(None, &new[new_index], container, anchor.as_ref(), adapter);
        } else if seq_cursor < 0 || x != seq[seq_cursor as usize] {
            move_vnode(&new[new_index], container, anchor.as_ref(), adapter);
        } else {
            seq_cursor -= 1;
        }
    }
}
