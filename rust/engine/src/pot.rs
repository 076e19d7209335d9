use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::errors::GameError;
use crate::holder::Board;
use crate::player::{Player, PlayerId};
use crate::rank::{best_hand, HandStrength};

/// A slice of the pot that only some players can win.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidePot {
    pub amount: u64,
    /// Players still in the hand who funded this layer, in table order.
    pub eligible: Vec<PlayerId>,
}

/// Chips committed during one hand, per player, across every betting round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pot {
    contributions: BTreeMap<PlayerId, u64>,
}

impl Pot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves `amount` from the player's stack into the pot. Fails without
    /// touching either side when the player holds fewer chips.
    pub fn bet(&mut self, player: &mut Player, amount: u64) -> Result<(), GameError> {
        player.take_chips(amount)?;
        *self
            .contributions
            .entry(player.id().to_string())
            .or_insert(0) += amount;
        Ok(())
    }

    pub fn contribution(&self, player_id: &str) -> u64 {
        self.contributions.get(player_id).copied().unwrap_or(0)
    }

    pub fn contributions(&self) -> &BTreeMap<PlayerId, u64> {
        &self.contributions
    }

    pub fn total(&self) -> u64 {
        self.contributions.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn clear(&mut self) {
        self.contributions.clear();
    }

    /// Splits the contributions into layers by all-in level, smallest first.
    ///
    /// Folded players still fund layers but are never eligible. A layer that
    /// nobody left in the hand funded is folded into the closest lower layer
    /// with eligible players, or the closest higher one if there is none.
    pub fn side_pots(&self, players: &[Player]) -> Vec<SidePot> {
        let mut levels: Vec<u64> = self
            .contributions
            .values()
            .copied()
            .filter(|&c| c > 0)
            .collect();
        levels.sort_unstable();
        levels.dedup();

        let mut seated: Vec<&Player> = players.iter().collect();
        seated.sort_by_key(|p| p.position());

        let mut pots: Vec<SidePot> = Vec::with_capacity(levels.len());
        let mut previous = 0;
        for level in levels {
            let funders = self.contributions.values().filter(|&&c| c >= level).count() as u64;
            let eligible = seated
                .iter()
                .filter(|p| p.is_playing() && self.contribution(p.id()) >= level)
                .map(|p| p.id().to_string())
                .collect();
            pots.push(SidePot {
                amount: (level - previous) * funders,
                eligible,
            });
            previous = level;
        }

        merge_dead_layers(pots)
    }

    /// Ranks every player still in the hand.
    pub fn rank_showdown(
        players: &[Player],
        board: &Board,
    ) -> Result<HashMap<PlayerId, HandStrength>, GameError> {
        players
            .iter()
            .filter(|p| p.is_playing())
            .map(|p| Ok((p.id().to_string(), best_hand(p.hand(), board)?)))
            .collect()
    }

    /// Showdown: ranks the remaining players and pays out every layer.
    pub fn apply_winning(
        &mut self,
        players: &mut [Player],
        board: &Board,
    ) -> Result<BTreeMap<PlayerId, u64>, GameError> {
        let ranks = Self::rank_showdown(players, board)?;
        Ok(self.distribute(players, &ranks))
    }

    /// Pays every layer to its best-ranked eligible players and empties the pot.
    ///
    /// Tied winners share a layer evenly; the odd chips go to the tied winner
    /// seated at the lowest position. Returns the total won per player.
    pub fn distribute(
        &mut self,
        players: &mut [Player],
        ranks: &HashMap<PlayerId, HandStrength>,
    ) -> BTreeMap<PlayerId, u64> {
        let total = self.total();
        let mut winnings: BTreeMap<PlayerId, u64> = BTreeMap::new();

        let pots = self.side_pots(players);
        if pots.iter().all(|p| p.eligible.is_empty()) {
            // Nobody left to pay; hand every chip back to whoever put it in.
            for (id, amount) in &self.contributions {
                if *amount > 0 {
                    winnings.insert(id.clone(), *amount);
                }
            }
        } else {
            for pot in pots {
                let contenders: Vec<(&PlayerId, &HandStrength)> = pot
                    .eligible
                    .iter()
                    .filter_map(|id| ranks.get(id).map(|r| (id, r)))
                    .collect();
                let Some(best) = contenders.iter().map(|(_, r)| *r).max() else {
                    continue;
                };
                // `eligible` is in table order, so the first winner takes the odd chips.
                let winners: Vec<&PlayerId> = contenders
                    .iter()
                    .filter(|(_, r)| *r == best)
                    .map(|(id, _)| *id)
                    .collect();
                let share = pot.amount / winners.len() as u64;
                let remainder = pot.amount % winners.len() as u64;
                for (i, id) in winners.into_iter().enumerate() {
                    let won = if i == 0 { share + remainder } else { share };
                    *winnings.entry(id.clone()).or_insert(0) += won;
                }
            }
        }

        debug_assert_eq!(
            winnings.values().sum::<u64>(),
            total,
            "showdown must pay out exactly what was bet"
        );

        for player in players.iter_mut() {
            if let Some(won) = winnings.get(player.id()) {
                player.add_chips(*won);
            }
        }
        self.contributions.clear();
        winnings
    }

    /// Everyone else folded: the whole pot goes to `winner`.
    pub fn award_uncontested(&mut self, winner: &mut Player) -> u64 {
        let total = self.total();
        winner.add_chips(total);
        self.contributions.clear();
        total
    }

    /// Returns each player's contribution, e.g. when a game is stopped mid-hand.
    pub fn refund_all(&mut self, players: &mut [Player]) -> BTreeMap<PlayerId, u64> {
        let mut refunds = BTreeMap::new();
        for player in players.iter_mut() {
            if let Some(amount) = self.contributions.remove(player.id()) {
                player.add_chips(amount);
                refunds.insert(player.id().to_string(), amount);
            }
        }
        debug_assert!(
            self.contributions.values().all(|&c| c == 0),
            "refund left chips of players no longer seated"
        );
        self.contributions.clear();
        refunds
    }
}

fn merge_dead_layers(mut pots: Vec<SidePot>) -> Vec<SidePot> {
    for i in 0..pots.len() {
        if !pots[i].eligible.is_empty() || pots[i].amount == 0 {
            continue;
        }
        let target = (0..i)
            .rev()
            .find(|&j| !pots[j].eligible.is_empty())
            .or_else(|| (i + 1..pots.len()).find(|&j| !pots[j].eligible.is_empty()));
        if let Some(j) = target {
            let amount = pots[i].amount;
            pots[j].amount += amount;
            pots[i].amount = 0;
        }
    }
    pots.retain(|p| p.amount > 0);
    pots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::holder::Hand;

    fn seated(id: &str, chips: u64, position: usize) -> Player {
        let mut p = Player::new(id, id, chips);
        p.set_position(position);
        p.seat_in_hand(Hand::new());
        p
    }

    #[test]
    fn bet_beyond_stack_leaves_pot_untouched() {
        let mut pot = Pot::new();
        let mut p = seated("a", 100, 0);
        assert!(pot.bet(&mut p, 101).is_err());
        assert_eq!(pot.total(), 0);
        assert_eq!(p.chips().get(), 100);
    }

    #[test]
    fn layers_follow_all_in_levels() {
        let mut pot = Pot::new();
        let mut players = vec![seated("a", 100, 0), seated("b", 300, 1), seated("c", 300, 2)];
        pot.bet(&mut players[0], 100).unwrap();
        pot.bet(&mut players[1], 300).unwrap();
        pot.bet(&mut players[2], 300).unwrap();
        let pots = pot.side_pots(&players);
        assert_eq!(pots.len(), 2);
        assert_eq!(pots[0].amount, 300);
        assert_eq!(pots[0].eligible, vec!["a", "b", "c"]);
        assert_eq!(pots[1].amount, 400);
        assert_eq!(pots[1].eligible, vec!["b", "c"]);
    }

    #[test]
    fn folded_top_layer_merges_down() {
        let mut pot = Pot::new();
        let mut players = vec![seated("a", 100, 0), seated("b", 500, 1)];
        pot.bet(&mut players[0], 100).unwrap();
        pot.bet(&mut players[1], 500).unwrap();
        players[1].fold();
        let pots = pot.side_pots(&players);
        assert_eq!(pots.len(), 1);
        assert_eq!(pots[0].amount, 600);
        assert_eq!(pots[0].eligible, vec!["a"]);
    }

    #[test]
    fn refund_returns_contributions() {
        let mut pot = Pot::new();
        let mut players = vec![seated("a", 100, 0), seated("b", 100, 1)];
        pot.bet(&mut players[0], 30).unwrap();
        pot.bet(&mut players[1], 70).unwrap();
        let refunds = pot.refund_all(&mut players);
        assert_eq!(refunds.get("b"), Some(&70));
        assert_eq!(players[0].chips().get(), 100);
        assert_eq!(players[1].chips().get(), 100);
        assert!(pot.is_empty());
    }
}
