//! 子站点层级遍历
//!
//! parent_id 链向上行走，带深度上限与已访问集合，遇到环时报错而不是死循环。

use std::collections::{HashMap, HashSet};

use tracing::error;

use super::ContentStore;
use super::models::Subsite;
use crate::errors::{PortalError, Result};

/// 层级最大深度
pub const MAX_TREE_DEPTH: usize = 64;

/// 返回 [根, ..., 自身]
///
/// 起点不存在时返回空列表；父节点缺失（null 或悬空）时在该处停止。
pub async fn breadcrumb_trail<S>(store: &S, subsite_id: &str) -> Result<Vec<Subsite>>
where
    S: ContentStore + ?Sized,
{
    let mut trail = Vec::new();
    let mut visited = HashSet::new();
    let mut current = store.get_subsite(subsite_id).await?;

    while let Some(subsite) = current {
        if !visited.insert(subsite.id.clone()) {
            error!(
                "Subsite hierarchy contains a cycle through {} (start: {})",
                subsite.id, subsite_id
            );
            return Err(PortalError::tree_integrity(format!(
                "Subsite hierarchy contains a cycle through {}",
                subsite.id
            )));
        }
        if trail.len() >= MAX_TREE_DEPTH {
            return Err(PortalError::tree_integrity(format!(
                "Subsite hierarchy deeper than {} levels",
                MAX_TREE_DEPTH
            )));
        }

        current = match subsite.parent_id.as_deref() {
            Some(parent_id) => store.get_subsite(parent_id).await?,
            None => None,
        };
        trail.push(subsite);
    }

    trail.reverse();
    Ok(trail)
}

/// 父子关系快照：id -> parent_id
pub type ParentMap = HashMap<String, Option<String>>;

/// 校验把子站点挂到 `parent_id` 下是否合法
///
/// `subsite_id` 为 None 表示新建。不允许成环；挂上后整棵子树的最深节点
/// 不得超过 `MAX_TREE_DEPTH` 层。缺失的父节点不计深度，与面包屑一致。
/// 由存储层在写锁或事务内调用。
pub fn check_placement(parents: &ParentMap, subsite_id: Option<&str>, parent_id: &str) -> Result<()> {
    let cycle_error = |id: &str| {
        PortalError::validation(format!(
            "Subsite {} cannot be moved under its own descendant {}",
            id, parent_id
        ))
    };

    if let Some(id) = subsite_id
        && id == parent_id
    {
        return Err(cycle_error(id));
    }

    // 新父节点自身的深度（根为 1）
    let mut parent_depth = 0;
    let mut visited = HashSet::new();
    let mut cursor = Some(parent_id);
    while let Some(id) = cursor {
        if let Some(moving) = subsite_id
            && moving == id
        {
            return Err(cycle_error(moving));
        }
        if !visited.insert(id) {
            return Err(PortalError::tree_integrity(format!(
                "Ancestors of {} form a cycle",
                parent_id
            )));
        }
        let Some(next) = parents.get(id) else {
            break;
        };
        parent_depth += 1;
        cursor = next.as_deref();
    }

    let height = match subsite_id {
        Some(id) => subtree_height(parents, id),
        None => 1,
    };
    if parent_depth + height > MAX_TREE_DEPTH {
        return Err(PortalError::validation(format!(
            "Subsite hierarchy cannot be deeper than {} levels",
            MAX_TREE_DEPTH
        )));
    }
    Ok(())
}

/// 以 `root_id` 为根的子树层数（只有自身时为 1）
fn subtree_height(parents: &ParentMap, root_id: &str) -> usize {
    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    for (id, parent) in parents {
        if let Some(parent) = parent {
            children.entry(parent.as_str()).or_default().push(id.as_str());
        }
    }

    let mut visited = HashSet::from([root_id]);
    let mut level = vec![root_id];
    let mut height = 0;
    while !level.is_empty() {
        height += 1;
        level = level
            .iter()
            .filter_map(|id| children.get(id))
            .flatten()
            .copied()
            .filter(|child| visited.insert(*child))
            .collect();
    }
    height
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::storage::models::{NewSubsite, SubsitePatch};

    async fn add(store: &MemoryStore, name: &str, parent: Option<&str>) -> Subsite {
        store
            .create_subsite(NewSubsite {
                name: name.to_string(),
                parent_id: parent.map(str::to_string),
                ..Default::default()
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_breadcrumb_unknown_start_is_empty() {
        let store = MemoryStore::new();
        assert!(breadcrumb_trail(&store, "missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_breadcrumb_stops_at_dangling_parent() {
        let store = MemoryStore::new();
        let orphan = add(&store, "Orphan", Some("gone")).await;

        let trail = breadcrumb_trail(&store, &orphan.id).await.unwrap();
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].id, orphan.id);
    }

    #[tokio::test]
    async fn test_breadcrumb_detects_cycle() {
        let store = MemoryStore::new();
        let a = add(&store, "A", None).await;
        let b = add(&store, "B", Some(&a.id)).await;

        // 写入路径会拒绝环，这里直接改数据模拟损坏
        store.set_parent_unchecked(&a.id, Some(&b.id));

        let err = breadcrumb_trail(&store, &b.id).await.unwrap_err();
        assert!(matches!(err, PortalError::TreeIntegrity(_)));
    }

    #[tokio::test]
    async fn test_breadcrumb_at_depth_limit() {
        let store = MemoryStore::new();
        let mut parent: Option<String> = None;
        for i in 0..MAX_TREE_DEPTH {
            let node = add(&store, &format!("L{}", i), parent.as_deref()).await;
            parent = Some(node.id);
        }

        let leaf = parent.unwrap();
        let trail = breadcrumb_trail(&store, &leaf).await.unwrap();
        assert_eq!(trail.len(), MAX_TREE_DEPTH);
        assert_eq!(trail[0].name, "L0");
    }

    fn chain(len: usize) -> ParentMap {
        (0..len)
            .map(|i| {
                let parent = if i == 0 { None } else { Some(format!("n{}", i - 1)) };
                (format!("n{}", i), parent)
            })
            .collect()
    }

    #[test]
    fn test_check_placement_rejects_cycles() {
        let parents = chain(3);

        let err = check_placement(&parents, Some("n0"), "n0").unwrap_err();
        assert!(matches!(err, PortalError::Validation(_)));
        let err = check_placement(&parents, Some("n0"), "n2").unwrap_err();
        assert!(matches!(err, PortalError::Validation(_)));

        assert!(check_placement(&parents, Some("n2"), "n0").is_ok());
        assert!(check_placement(&parents, Some("n1"), "dangling").is_ok());
        assert!(check_placement(&parents, None, "n2").is_ok());
    }

    #[test]
    fn test_check_placement_depth_limit() {
        let parents = chain(MAX_TREE_DEPTH);
        let deepest = format!("n{}", MAX_TREE_DEPTH - 1);
        let second_deepest = format!("n{}", MAX_TREE_DEPTH - 2);

        let err = check_placement(&parents, None, &deepest).unwrap_err();
        assert!(matches!(err, PortalError::Validation(_)));
        assert!(check_placement(&parents, None, &second_deepest).is_ok());
    }

    #[test]
    fn test_check_placement_counts_moved_subtree() {
        let mut parents = chain(MAX_TREE_DEPTH - 1);
        parents.insert("other".to_string(), None);
        parents.insert("other-child".to_string(), Some("other".to_string()));
        let deepest = format!("n{}", MAX_TREE_DEPTH - 2);

        // other 本身可以挂到最深处，但带着子节点就超出上限
        let err = check_placement(&parents, Some("other"), &deepest).unwrap_err();
        assert!(matches!(err, PortalError::Validation(_)));
        assert!(check_placement(&parents, Some("other-child"), &deepest).is_ok());
    }
}
