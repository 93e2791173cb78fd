//! 部门树

use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

use crate::error::{AppError, AppResult};
use crate::modules::system::models::{Dept, DeptInput, Operator};
use crate::store::{DeptStore, Store};

/// 树节点
#[derive(Debug, Clone, Serialize)]
pub struct DeptNode {
    #[serde(flatten)]
    pub dept: Dept,
    pub children: Vec<DeptNode>,
}

fn children_index(depts: &[Dept]) -> HashMap<Option<i64>, Vec<&Dept>> {
    let ids: BTreeSet<i64> = depts.iter().map(Dept::id).collect();
    let mut index: HashMap<Option<i64>, Vec<&Dept>> = HashMap::new();
    for dept in depts {
        // 父部门已删除的节点挂到根上
        let parent = dept.parent_id.filter(|p| ids.contains(p));
        index.entry(parent).or_default().push(dept);
    }
    for children in index.values_mut() {
        children.sort_by_key(|d| (d.sort, d.id()));
    }
    index
}

pub fn build_tree(depts: &[Dept]) -> Vec<DeptNode> {
    fn build(
        index: &HashMap<Option<i64>, Vec<&Dept>>,
        parent: Option<i64>,
        seen: &mut BTreeSet<i64>,
    ) -> Vec<DeptNode> {
        let Some(children) = index.get(&parent) else {
            return Vec::new();
        };
        let mut nodes = Vec::with_capacity(children.len());
        for dept in children {
            // 数据里若有环，已挂过的节点不再重复展开
            if !seen.insert(dept.id()) {
                continue;
            }
            nodes.push(DeptNode {
                dept: (*dept).clone(),
                children: build(index, Some(dept.id()), seen),
            });
        }
        nodes
    }

    let index = children_index(depts);
    build(&index, None, &mut BTreeSet::new())
}

/// 从根到该部门的名称，以 `/` 连接
pub fn region_name(depts: &[Dept], id: i64) -> Option<String> {
    let by_id: HashMap<i64, &Dept> = depts.iter().map(|d| (d.id(), d)).collect();
    let mut names = Vec::new();
    let mut seen = BTreeSet::new();
    let mut current = by_id.get(&id).copied();
    while let Some(dept) = current {
        if !seen.insert(dept.id()) {
            break;
        }
        names.push(dept.name.as_str());
        current = dept.parent_id.and_then(|p| by_id.get(&p).copied());
    }
    if names.is_empty() {
        return None;
    }
    names.reverse();
    Some(names.join("/"))
}

/// 部门自身及全部下级部门 id
pub fn descendant_ids(depts: &[Dept], id: i64) -> Vec<i64> {
    let mut result = BTreeSet::new();
    let mut stack = vec![id];
    while let Some(current) = stack.pop() {
        if !result.insert(current) {
            continue;
        }
        stack.extend(
            depts
                .iter()
                .filter(|d| d.parent_id == Some(current))
                .map(Dept::id),
        );
    }
    result.into_iter().collect()
}

async fn check_parent(
    store: &dyn Store,
    tenant: &str,
    parent_id: Option<i64>,
) -> AppResult<()> {
    if let Some(parent_id) = parent_id {
        store
            .get_dept(tenant, parent_id)
            .await?
            .ok_or_else(|| AppError::validation("上级部门不存在"))?;
    }
    Ok(())
}

pub async fn create_dept(
    store: &dyn Store,
    tenant: &str,
    input: DeptInput,
    op: &Operator,
) -> AppResult<Dept> {
    check_parent(store, tenant, input.parent_id).await?;
    Ok(store.create_dept(tenant, input, op).await?)
}

pub async fn update_dept(
    store: &dyn Store,
    tenant: &str,
    id: i64,
    input: DeptInput,
    op: &Operator,
) -> AppResult<Dept> {
    let mut dept = store
        .get_dept(tenant, id)
        .await?
        .ok_or_else(|| AppError::not_found("部门"))?;
    if let Some(parent_id) = input.parent_id {
        let depts = store.list_depts(tenant).await?;
        if descendant_ids(&depts, id).contains(&parent_id) {
            return Err(AppError::validation("上级部门不能是自身或下级部门"));
        }
        check_parent(store, tenant, Some(parent_id)).await?;
    }
    input.apply(&mut dept);
    Ok(store.update_dept(tenant, &dept, op).await?)
}

/// 软删除部门及全部下级部门，返回删除数量
pub async fn delete_dept(store: &dyn Store, tenant: &str, id: i64, op: &Operator) -> AppResult<usize> {
    let depts = store.list_depts(tenant).await?;
    if !depts.iter().any(|d| d.id() == id) {
        return Err(AppError::not_found("部门"));
    }
    let ids = descendant_ids(&depts, id);
    store.delete_depts(tenant, &ids, op).await?;
    Ok(ids.len())
}
