use crate::config::{EntityKind, FilterMode};
use crate::events::EntityId;
use crate::services::wm::{Node, Output};
use std::collections::HashSet;

/// Множество сущностей, допустимых как цели цикла прямо сейчас.
///
/// Вычисляется заново на каждый триггер по свежему состоянию window manager и
/// никогда не кэшируется. `outputs` нужен только режиму visible-workspaces,
/// остальным вызывающая сторона передаёт пустой срез.
pub fn valid_entities(
    kind: EntityKind,
    mode: FilterMode,
    tree: &Node,
    focused_ws: Option<&Node>,
    outputs: &[Output],
) -> HashSet<EntityId> {
    match kind {
        EntityKind::Window => valid_windows(mode, tree, focused_ws, outputs),
        EntityKind::Workspace => valid_workspaces(mode, tree, focused_ws),
    }
}

fn valid_windows(
    mode: FilterMode,
    tree: &Node,
    focused_ws: Option<&Node>,
    outputs: &[Output],
) -> HashSet<EntityId> {
    match mode {
        FilterMode::ActiveWorkspace | FilterMode::FocusedWorkspace => focused_ws
            .map(|ws| leaf_ids(ws))
            .unwrap_or_default(),
        FilterMode::VisibleWorkspaces => {
            // Рабочие столы, показанные на активных output'ах
            let visible: HashSet<&str> = outputs
                .iter()
                .filter(|o| o.active)
                .filter_map(|o| o.current_workspace.as_deref())
                .collect();

            let mut set = HashSet::new();
            for ws in tree.workspaces() {
                let shown = ws
                    .name
                    .as_deref()
                    .map(|name| visible.contains(name))
                    .unwrap_or(false);
                if shown {
                    set.extend(leaf_ids(ws));
                }
            }
            set
        }
        FilterMode::FocusedOutput => {
            let focused_output = focused_ws.and_then(|ws| ws.output.as_deref());
            let mut set = HashSet::new();
            for ws in tree.workspaces() {
                if ws.output.as_deref() == focused_output {
                    set.extend(leaf_ids(ws));
                }
            }
            set
        }
        FilterMode::All => leaf_ids(tree),
    }
}

fn valid_workspaces(
    mode: FilterMode,
    tree: &Node,
    focused_ws: Option<&Node>,
) -> HashSet<EntityId> {
    let on_focused_output = mode == FilterMode::FocusedOutput;
    let focused_output = focused_ws.and_then(|ws| ws.output.as_deref());

    tree.workspaces()
        .into_iter()
        .filter(|ws| !on_focused_output || ws.output.as_deref() == focused_output)
        .filter_map(|ws| ws.name.clone())
        .map(EntityId::Workspace)
        .collect()
}

fn leaf_ids(node: &Node) -> HashSet<EntityId> {
    node.leaves()
        .into_iter()
        .map(|leaf| EntityId::Window(leaf.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::wm::tree::tests::sample_tree;

    fn ws_set(names: &[&str]) -> HashSet<EntityId> {
        names.iter().map(|n| EntityId::workspace(*n)).collect()
    }

    fn win_set(ids: &[i64]) -> HashSet<EntityId> {
        ids.iter().copied().map(EntityId::Window).collect()
    }

    #[test]
    fn test_all_windows() {
        let tree = sample_tree();
        let set = valid_entities(EntityKind::Window, FilterMode::All, &tree, None, &[]);
        assert_eq!(set, win_set(&[11, 12, 13, 14, 31]));
    }

    #[test]
    fn test_focused_workspace_windows() {
        let tree = sample_tree();
        let focused_ws = tree.find_focused_workspace();

        for mode in [FilterMode::ActiveWorkspace, FilterMode::FocusedWorkspace] {
            let set = valid_entities(EntityKind::Window, mode, &tree, focused_ws, &[]);
            assert_eq!(set, win_set(&[12, 13, 14]));
        }
    }

    #[test]
    fn test_visible_workspaces_windows() {
        let tree = sample_tree();
        let outputs = vec![
            Output {
                name: "DP-1".to_string(),
                active: true,
                current_workspace: Some("2".to_string()),
            },
            Output {
                name: "HDMI-1".to_string(),
                active: true,
                current_workspace: Some("3".to_string()),
            },
            Output {
                name: "DP-2".to_string(),
                active: false,
                current_workspace: Some("1".to_string()),
            },
        ];

        let set = valid_entities(
            EntityKind::Window,
            FilterMode::VisibleWorkspaces,
            &tree,
            tree.find_focused_workspace(),
            &outputs,
        );
        // Рабочий стол "1" скрыт, его окна не попадают в множество
        assert_eq!(set, win_set(&[12, 13, 14, 31]));
    }

    #[test]
    fn test_focused_output_windows() {
        let tree = sample_tree();
        let set = valid_entities(
            EntityKind::Window,
            FilterMode::FocusedOutput,
            &tree,
            tree.find_focused_workspace(),
            &[],
        );
        // Фокус на DP-1: окна обоих его рабочих столов, HDMI-1 исключён
        assert_eq!(set, win_set(&[11, 12, 13, 14]));
    }

    #[test]
    fn test_workspace_kind_modes() {
        let tree = sample_tree();
        let focused_ws = tree.find_focused_workspace();

        let all = valid_entities(EntityKind::Workspace, FilterMode::All, &tree, focused_ws, &[]);
        assert_eq!(all, ws_set(&["1", "2", "3"]));

        let per_output = valid_entities(
            EntityKind::Workspace,
            FilterMode::FocusedOutput,
            &tree,
            focused_ws,
            &[],
        );
        assert_eq!(per_output, ws_set(&["1", "2"]));
    }
}
