use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Unique identifier with generation tracking to prevent stale references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct GenerationalId {
    pub index: usize,
    pub generation: u32,
}

impl GenerationalId {
    pub fn new(index: usize, generation: u32) -> Self {
        Self { index, generation }
    }
}

/// Actor identifier wrapper used across the collision world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct ActorId(pub GenerationalId);

impl ActorId {
    pub fn new(index: usize, generation: u32) -> Self {
        Self(GenerationalId::new(index, generation))
    }

    pub fn from_index(index: u32) -> Self {
        Self::new(index as usize, 0)
    }

    pub fn index(&self) -> usize {
        self.0.index
    }

    pub fn generation(&self) -> u32 {
        self.0.generation
    }

    pub fn is_null(&self) -> bool {
        self.0.index == usize::MAX
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self(GenerationalId::new(usize::MAX, 0))
    }
}

/// Generational arena that hands out stable IDs while preventing use-after-free.
pub struct Arena<T> {
    items: Vec<Option<T>>,
    generations: Vec<u32>,
    free_list: VecDeque<usize>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            generations: Vec::new(),
            free_list: VecDeque::new(),
        }
    }

    pub fn insert(&mut self, item: T) -> ActorId {
        if let Some(index) = self.free_list.pop_front() {
            let generation = self.generations[index];
            self.items[index] = Some(item);
            return ActorId::new(index, generation);
        }

        let index = self.items.len();
        self.items.push(Some(item));
        self.generations.push(0);
        ActorId::new(index, 0)
    }

    pub fn get(&self, id: ActorId) -> Option<&T> {
        if self.is_valid(id) {
            self.items.get(id.index()).and_then(|slot| slot.as_ref())
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut T> {
        if self.is_valid(id) {
            self.items.get_mut(id.index()).and_then(|slot| slot.as_mut())
        } else {
            None
        }
    }

    pub fn remove(&mut self, id: ActorId) -> Option<T> {
        if !self.is_valid(id) {
            return None;
        }
        if let Some(slot) = self.items.get_mut(id.index()) {
            if slot.is_some() {
                self.generations[id.index()] = self.generations[id.index()].wrapping_add(1);
                self.free_list.push_back(id.index());
            }
            slot.take()
        } else {
            None
        }
    }

    pub fn iter(&self) -> ArenaIter<'_, T> {
        ArenaIter {
            inner: self.items.iter(),
        }
    }

    pub fn iter_mut(&mut self) -> ArenaIterMut<'_, T> {
        ArenaIterMut {
            inner: self.items.iter_mut(),
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.items.iter().enumerate().filter_map(|(index, slot)| {
            slot.as_ref()
                .map(|_| ActorId::new(index, self.generations[index]))
        })
    }

    pub fn len(&self) -> usize {
        self.items.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_valid(&self, id: ActorId) -> bool {
        self.generations
            .get(id.index())
            .copied()
            .map(|gen| gen == id.generation())
            .unwrap_or(false)
    }
}

pub struct ArenaIter<'a, T> {
    inner: std::slice::Iter<'a, Option<T>>,
}

impl<'a, T> Iterator for ArenaIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.inner.by_ref() {
            if let Some(item) = slot.as_ref() {
                return Some(item);
            }
        }
        None
    }
}

pub struct ArenaIterMut<'a, T> {
    inner: std::slice::IterMut<'a, Option<T>>,
}

impl<'a, T> Iterator for ArenaIterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.inner.by_ref() {
            if let Some(item) = slot.as_mut() {
                return Some(item);
            }
        }
        None
    }
}
