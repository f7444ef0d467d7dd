use std::ops::{Deref, DerefMut};
use std::time::Instant;

use arrayvec::ArrayVec;

use crate::environment::GameState;
use crate::search::MAX_DEPTH;

/// Positions on the path from the search root to the node being searched.
///
/// Every child position is pushed through [`State::make_move`], which returns
/// a [`Ply`] guard. Dropping the guard pops the position, so the parent is
/// restored on every exit path: after a cutoff, after a normal return and when
/// an error is propagated with `?`.
pub(super) struct State<S: GameState> {
    position_history: ArrayVec<S, { MAX_DEPTH as usize + 1 }>,
    searched_nodes: u64,
    deadline: Option<Instant>,
}

impl<S: GameState> State<S> {
    pub(super) fn new(root: S) -> Self {
        Self::with_deadline(root, None)
    }

    /// Same as [`State::new`], but the search should stop expanding positions
    /// once `deadline` has passed.
    pub(super) fn with_deadline(root: S, deadline: Option<Instant>) -> Self {
        let mut position_history = ArrayVec::new();
        position_history.push(root);

        Self {
            position_history,
            searched_nodes: 1,
            deadline,
        }
    }

    #[must_use]
    pub(super) fn out_of_time(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Plays `action` on top of the current position. The returned guard
    /// undoes the move when it goes out of scope.
    #[must_use]
    pub(super) fn make_move(&mut self, action: &S::Move) -> Ply<'_, S> {
        let mut position = self.last().clone();
        position.apply(action);
        self.position_history.push(position);
        self.searched_nodes += 1;
        Ply { state: self }
    }

    fn pop(&mut self) {
        // The root is never popped.
        debug_assert!(self.position_history.len() > 1);
        let _ = self.position_history.pop();
    }

    #[must_use]
    pub(super) fn last(&self) -> &S {
        // The root is pushed on construction and is never popped.
        &self.position_history[self.position_history.len() - 1]
    }

    #[must_use]
    pub(super) const fn searched_nodes(&self) -> u64 {
        self.searched_nodes
    }

    /// Number of moves played since the root.
    #[must_use]
    pub(super) fn ply(&self) -> usize {
        self.position_history.len() - 1
    }
}

/// A move made on top of [`State`]; undone on drop.
pub(super) struct Ply<'a, S: GameState> {
    state: &'a mut State<S>,
}

impl<S: GameState> Deref for Ply<'_, S> {
    type Target = State<S>;

    fn deref(&self) -> &Self::Target {
        &*self.state
    }
}

impl<S: GameState> DerefMut for Ply<'_, S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.state
    }
}

impl<S: GameState> Drop for Ply<'_, S> {
    fn drop(&mut self) {
        self.state.pop();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use shakmaty::{Chess, Position};

    use super::*;
    use crate::chess::parse_uci;
    use crate::environment::Player;

    #[test]
    fn guard_restores_position() {
        let mut state = State::new(Chess::default());
        assert_eq!(state.searched_nodes(), 1);
        assert_eq!(state.ply(), 0);

        let e4 = parse_uci(state.last(), "e2e4").unwrap();
        {
            let mut ply = state.make_move(&e4);
            assert_eq!(ply.ply(), 1);
            assert_eq!(ply.last().side_to_move(), Player::Black);

            let e5 = parse_uci(ply.last(), "e7e5").unwrap();
            let reply = ply.make_move(&e5);
            assert_eq!(reply.ply(), 2);
            assert_eq!(reply.last().side_to_move(), Player::White);
        }
        assert_eq!(state.ply(), 0);
        assert_eq!(state.last().board(), Chess::default().board());
        assert_eq!(state.searched_nodes(), 3);
    }

    #[test]
    fn guard_restores_on_early_return() {
        fn failing(state: &mut State<Chess>) -> Result<(), ()> {
            let action = parse_uci(state.last(), "g1f3").map_err(|_| ())?;
            let ply = state.make_move(&action);
            assert_eq!(ply.ply(), 1);
            Err(())
        }

        let mut state = State::new(Chess::default());
        assert!(failing(&mut state).is_err());
        assert_eq!(state.ply(), 0);
    }

    #[test]
    fn deadline() {
        assert!(!State::new(Chess::default()).out_of_time());
        assert!(State::with_deadline(Chess::default(), Some(Instant::now())).out_of_time());
        let later = Instant::now() + Duration::from_secs(3600);
        assert!(!State::with_deadline(Chess::default(), Some(later)).out_of_time());
    }
}
