use super::model::Todo;

/// Client-side copy of the signed-in user's todos.
///
/// The cache is only ever changed from records the server returned after a
/// successful call: `replace_all` after a list, `upsert` after a create or
/// update, `evict` after a delete, `clear` on sign-out. Nothing is applied
/// speculatively.
#[derive(Debug, Default, Clone)]
pub struct TodoCache {
    items: Vec<Todo>,
}

impl TodoCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace_all(&mut self, todos: Vec<Todo>) {
        self.items = todos;
    }

    /// Replace the cached record with the same id in place, or append.
    pub fn upsert(&mut self, todo: Todo) {
        match self.items.iter_mut().find(|t| t.id == todo.id) {
            Some(slot) => *slot = todo,
            None => self.items.push(todo),
        }
    }

    pub fn evict(&mut self, id: i64) -> Option<Todo> {
        let pos = self.items.iter().position(|t| t.id == id)?;
        Some(self.items.remove(pos))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn get(&self, id: i64) -> Option<&Todo> {
        self.items.iter().find(|t| t.id == id)
    }

    pub fn todos(&self) -> &[Todo] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
