use serde::Deserialize;

/// Узел дерева контейнеров sway/i3 (ответ на get_tree).
///
/// Разбираются только поля, нужные для ведения истории и фильтрации целей;
/// остальное из ответа IPC игнорируется.
#[derive(Debug, Clone, Deserialize)]
pub struct Node {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub node_type: String,
    #[serde(default)]
    pub num: Option<i32>,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub focused: bool,
    /// Состояние floating в терминах i3 ("user_on", "auto_on", ...)
    #[serde(default)]
    pub floating: Option<String>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub floating_nodes: Vec<Node>,
}

/// Output из ответа get_outputs
#[derive(Debug, Clone, Deserialize)]
pub struct Output {
    pub name: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub current_workspace: Option<String>,
}

impl Node {
    /// Плавающий контейнер: sway помечает типом, i3 - полем floating
    pub fn is_floating(&self) -> bool {
        if self.node_type == "floating_con" {
            return true;
        }
        matches!(self.floating.as_deref(), Some("user_on") | Some("auto_on"))
    }

    fn children(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().chain(self.floating_nodes.iter())
    }

    /// Все узлы-рабочие столы дерева
    pub fn workspaces(&self) -> Vec<&Node> {
        let mut result = Vec::new();
        self.collect_workspaces(&mut result);
        result
    }

    fn collect_workspaces<'a>(&'a self, result: &mut Vec<&'a Node>) {
        if self.node_type == "workspace" {
            result.push(self);
            return;
        }
        for child in self.children() {
            child.collect_workspaces(result);
        }
    }

    /// Листовые контейнеры-окна под этим узлом (включая плавающие)
    pub fn leaves(&self) -> Vec<&Node> {
        let mut result = Vec::new();
        self.collect_leaves(&mut result);
        result
    }

    fn collect_leaves<'a>(&'a self, result: &mut Vec<&'a Node>) {
        let mut has_children = false;
        for child in self.children() {
            has_children = true;
            child.collect_leaves(result);
        }
        if !has_children && matches!(self.node_type.as_str(), "con" | "floating_con") {
            result.push(self);
        }
    }

    /// Сфокусированный узел дерева, если есть
    pub fn find_focused(&self) -> Option<&Node> {
        if self.focused {
            return Some(self);
        }
        self.children().find_map(|child| child.find_focused())
    }

    /// Рабочий стол, содержащий фокус (либо сфокусированный сам по себе)
    pub fn find_focused_workspace(&self) -> Option<&Node> {
        self.workspaces()
            .into_iter()
            .find(|ws| ws.focused || ws.find_focused().is_some())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    /// Небольшое дерево для тестов: два output'а, три рабочих стола,
    /// фокус на окне 12 рабочего стола "2".
    pub(crate) fn sample_tree() -> Node {
        let value = json!({
            "id": 1,
            "type": "root",
            "nodes": [
                {
                    "id": 2, "type": "output", "name": "DP-1",
                    "nodes": [
                        {
                            "id": 10, "type": "workspace", "name": "1", "num": 1,
                            "output": "DP-1",
                            "nodes": [
                                {"id": 11, "type": "con", "name": "term"}
                            ]
                        },
                        {
                            "id": 20, "type": "workspace", "name": "2", "num": 2,
                            "output": "DP-1",
                            "nodes": [
                                {"id": 12, "type": "con", "name": "editor", "focused": true},
                                {"id": 13, "type": "con", "name": "browser"}
                            ],
                            "floating_nodes": [
                                {"id": 14, "type": "floating_con", "name": "popup"}
                            ]
                        }
                    ]
                },
                {
                    "id": 3, "type": "output", "name": "HDMI-1",
                    "nodes": [
                        {
                            "id": 30, "type": "workspace", "name": "3", "num": 3,
                            "output": "HDMI-1",
                            "nodes": [
                                {"id": 31, "type": "con", "name": "mail"}
                            ]
                        }
                    ]
                }
            ]
        });
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_tree_navigation() {
        let tree = sample_tree();

        let ws: Vec<_> = tree
            .workspaces()
            .iter()
            .filter_map(|w| w.name.clone())
            .collect();
        assert_eq!(ws, vec!["1", "2", "3"]);

        let leaves: Vec<i64> = tree.leaves().iter().map(|n| n.id).collect();
        assert_eq!(leaves, vec![11, 12, 13, 14, 31]);

        assert_eq!(tree.find_focused().map(|n| n.id), Some(12));

        let focused_ws = tree.find_focused_workspace().unwrap();
        assert_eq!(focused_ws.name.as_deref(), Some("2"));
        assert_eq!(focused_ws.output.as_deref(), Some("DP-1"));
    }

    #[test]
    fn test_floating_detection() {
        let tree = sample_tree();
        let floating = tree.leaves().iter().find(|n| n.id == 14).copied().unwrap();
        assert!(floating.is_floating());

        let i3_style: Node = serde_json::from_value(json!({
            "id": 99, "type": "con", "floating": "user_on"
        }))
        .unwrap();
        assert!(i3_style.is_floating());

        let tiled: Node = serde_json::from_value(json!({
            "id": 98, "type": "con", "floating": "auto_off"
        }))
        .unwrap();
        assert!(!tiled.is_floating());
    }
}
