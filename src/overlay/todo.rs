//! Todo list

use serde::{Deserialize, Serialize};

/// One entry in the list
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: u64,
    pub text: String,
    pub completed: bool,
}

/// Ordered todo entries with stable ids
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TodoList {
    next_id: u64,
    items: Vec<TodoItem>,
}

impl TodoList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Blank text is ignored and returns None.
    pub fn add(&mut self, text: &str) -> Option<u64> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        // Keep ids unique even if a loaded file was edited by hand
        let id = self
            .items
            .iter()
            .map(|item| item.id + 1)
            .max()
            .unwrap_or(0)
            .max(self.next_id);
        self.next_id = id + 1;
        self.items.push(TodoItem {
            id,
            text: text.to_string(),
            completed: false,
        });
        Some(id)
    }

    /// Flip completion. Returns false for an unknown id.
    pub fn toggle(&mut self, id: u64) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.completed = !item.completed;
                true
            }
            None => false,
        }
    }

    /// Remove an entry. Returns false for an unknown id.
    pub fn delete(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|item| item.completed).count()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TodoItem> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_trims_and_ignores_blank() {
        let mut todos = TodoList::new();
        assert!(todos.add("   ").is_none());
        assert!(todos.add("").is_none());
        let id = todos.add("  water the plant ").unwrap();
        assert_eq!(todos.len(), 1);
        assert_eq!(todos.iter().next().unwrap().text, "water the plant");
        assert!(!todos.iter().next().unwrap().completed);
        assert_eq!(id, 0);
    }

    #[test]
    fn test_toggle_and_count() {
        let mut todos = TodoList::new();
        let a = todos.add("read").unwrap();
        let b = todos.add("write").unwrap();
        assert!(todos.toggle(a));
        assert_eq!(todos.completed_count(), 1);
        assert!(todos.toggle(a));
        assert!(todos.toggle(b));
        assert_eq!(todos.completed_count(), 1);
        assert!(!todos.toggle(99));
    }

    #[test]
    fn test_delete() {
        let mut todos = TodoList::new();
        let a = todos.add("read").unwrap();
        let b = todos.add("write").unwrap();
        assert!(todos.delete(a));
        assert!(!todos.delete(a));
        assert_eq!(todos.len(), 1);
        assert_eq!(todos.iter().next().unwrap().id, b);
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let mut todos = TodoList::new();
        let a = todos.add("one").unwrap();
        todos.delete(a);
        let b = todos.add("two").unwrap();
        assert_ne!(a, b);
    }
}
