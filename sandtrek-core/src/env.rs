//! Pure state-transition environment and the bounded action enumerator.

use smallvec::SmallVec;

use crate::config::{ConfigError, ProblemConfig};
use crate::map::{MapError, NodeId, NodeKind, SupplyPoint};
use crate::state::{Action, DayRecord, TrekState};
use crate::weather::WEATHER_SUNNY;

/// Prices injected at supply-kind nodes the ingestion layer left bare.
const DEFAULT_FOOD_PRICE: f64 = 8.0;
const DEFAULT_WATER_PRICE: f64 = 5.0;
/// Purchase quantities enumerated at a supply node.
const PURCHASE_GRID: [f64; 3] = [0.0, 2.0, 5.0];

/// Candidate actions for one state. Branching is bounded by
/// `1 + degree + 9`, which fits inline for typical maps.
pub type ActionSet = SmallVec<[Action; 16]>;

/// The transition model for one validated configuration.
///
/// Construction is the fatal-error boundary: the config is checked and its
/// derived tables rebuilt once, and the start/end nodes are resolved once.
/// After that every operation is infallible and infeasibility is an absent
/// result, never an error.
#[derive(Debug, Clone)]
pub struct Environment {
    cfg: ProblemConfig,
    start: NodeId,
    end: NodeId,
}

impl Environment {
    /// Build an environment over a private sanitized copy of `cfg`:
    /// `start`, `mine`, and `village` nodes without an explicit supply
    /// point receive the default prices. The caller's value is never
    /// mutated.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the configuration fails its shape
    /// checks.
    pub fn new(cfg: &ProblemConfig) -> Result<Self, ConfigError> {
        let mut cfg = cfg.clone();
        cfg.map.rebuild()?;
        cfg.validate()?;
        for node in cfg.map.nodes.values_mut() {
            if node.kind.has_default_supply() && node.supply.is_none() {
                node.supply = Some(SupplyPoint::buy_only(
                    DEFAULT_FOOD_PRICE,
                    DEFAULT_WATER_PRICE,
                ));
            }
        }
        let start = cfg
            .map
            .start_node()
            .ok_or(MapError::EmptyGraph)?
            .to_string();
        let end = cfg.map.end_node().ok_or(MapError::EmptyGraph)?.to_string();
        Ok(Self { cfg, start, end })
    }

    #[must_use]
    pub fn config(&self) -> &ProblemConfig {
        &self.cfg
    }

    #[must_use]
    pub fn start_node(&self) -> &str {
        &self.start
    }

    #[must_use]
    pub fn end_node(&self) -> &str {
        &self.end
    }

    /// The day-1 state at the start node with the configured cash.
    #[must_use]
    pub fn initial_state(&self) -> TrekState {
        TrekState::initial(self.start.clone(), self.cfg.economy.initial_cash)
    }

    /// Whether the state stands on an `end`-kind node.
    #[must_use]
    pub fn reached_end(&self, state: &TrekState) -> bool {
        self.cfg
            .map
            .node(&state.position)
            .is_some_and(|node| node.kind == NodeKind::End)
    }

    /// Max travel distance and food/water consumption for a weather tag.
    /// Unknown tags scale by the identity multipliers.
    fn rates_for(&self, tag: &str) -> (f64, f64, f64) {
        let effect = self.cfg.weather_rules.get(tag).copied().unwrap_or_default();
        (
            self.cfg.travel_base * effect.travel_mult,
            self.cfg.food_base * effect.food_mult,
            self.cfg.water_base * effect.water_mult,
        )
    }

    /// Enumerate the bounded candidate set for a state: rest, one move per
    /// neighbor, and the 3x3 purchase grid at supply nodes. Distance and
    /// weight feasibility are not pre-filtered here; [`Environment::step`]
    /// re-validates every candidate.
    #[must_use]
    pub fn candidate_actions(&self, state: &TrekState) -> ActionSet {
        let mut actions = ActionSet::new();
        actions.push(Action::Rest);
        for (neighbor, _) in self.cfg.map.neighbors(&state.position) {
            actions.push(Action::move_to(neighbor.clone()));
        }
        let has_supply = self
            .cfg
            .map
            .node(&state.position)
            .is_some_and(|node| node.supply.is_some());
        if has_supply {
            for buy_food in PURCHASE_GRID {
                for buy_water in PURCHASE_GRID {
                    actions.push(Action::purchase(buy_food, buy_water));
                }
            }
        }
        actions
    }

    /// Transition `state` by `action`, yielding the successor or `None`
    /// when the action is infeasible: horizon exhausted, unreachable or
    /// too-distant neighbor, overweight load, or starvation. Inputs are
    /// never mutated.
    #[must_use]
    pub fn step(&self, state: &TrekState, action: &Action) -> Option<TrekState> {
        let day_idx = state.day.checked_sub(1)? as usize;
        if day_idx >= self.cfg.days as usize {
            return None;
        }
        let raw_tag = self.cfg.weather_on(day_idx)?;
        let effective = if raw_tag.is_empty() {
            WEATHER_SUNNY
        } else {
            raw_tag
        };
        let (max_travel, food_cons, water_cons) = self.rates_for(effective);

        let mut next_pos = state.position.clone();
        let mut move_dist = 0.0;
        if let Some(target) = action.move_target() {
            // Duplicate edges resolve to the last entry.
            let distance = self
                .cfg
                .map
                .neighbors(&state.position)
                .iter()
                .rev()
                .find(|(id, _)| id == target)
                .map(|(_, d)| *d)?;
            if distance > max_travel {
                return None;
            }
            move_dist = distance;
            next_pos = target.to_string();
        }

        let (buy_food, buy_water, sell_food, sell_water) = action.trade_quantities();
        let mut cash = state.cash;
        let food = state.food + buy_food - sell_food;
        let water = state.water + buy_water - sell_water;
        if let Some(supply) = self
            .cfg
            .map
            .node(&state.position)
            .and_then(|node| node.supply.as_ref())
        {
            cash -= buy_food * supply.buy_price_food + buy_water * supply.buy_price_water;
            if let Some(price) = supply.sell_price_food {
                cash += sell_food * price;
            }
            if let Some(price) = supply.sell_price_water {
                cash += sell_water * price;
            }
        }

        if self.cfg.bag.load_weight(food, water) > self.cfg.bag.max_weight {
            return None;
        }

        let food = food - food_cons;
        let water = water - water_cons;
        if food < 0.0 || water < 0.0 {
            return None;
        }

        let mut history = Vec::with_capacity(state.history.len() + 1);
        history.extend(state.history.iter().cloned());
        history.push(DayRecord {
            day: state.day,
            pos: state.position.clone(),
            next_pos: next_pos.clone(),
            move_dist,
            buy_food,
            buy_water,
            sell_food,
            sell_water,
            cash,
            food,
            water,
            weather: raw_tag.to_string(),
        });

        Some(TrekState {
            day: state.day + 1,
            position: next_pos,
            food,
            water,
            cash,
            history,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BagConfig, EconomicConfig};
    use crate::map::{MapEdge, MapGraph, MapNode};
    use crate::weather::{DayCondition, WEATHER_SAND, default_weather_rules};

    fn desert_config() -> ProblemConfig {
        let map = MapGraph::new(
            vec![
                MapNode::new("a", "Camp", NodeKind::Start),
                MapNode::new("b", "Dunes", NodeKind::Normal),
                MapNode::new("c", "Oasis", NodeKind::End),
            ],
            vec![MapEdge::new("a", "b", 4.0), MapEdge::new("b", "c", 6.0)],
        )
        .unwrap();
        ProblemConfig {
            days: 5,
            bag: BagConfig::default(),
            economy: EconomicConfig {
                initial_cash: 600.0,
                base_profit: 0.0,
            },
            day_conditions: DayCondition::sequence(vec![WEATHER_SUNNY.to_string(); 5]),
            map,
            weather_rules: default_weather_rules(),
            travel_base: 12.0,
            food_base: 2.0,
            water_base: 3.0,
        }
    }

    fn env() -> Environment {
        Environment::new(&desert_config()).unwrap()
    }

    /// Two days of provisioning at the start node, enough to survive a
    /// move on day three.
    fn stocked(env: &Environment) -> TrekState {
        let first = env
            .step(&env.initial_state(), &Action::purchase(5.0, 5.0))
            .unwrap();
        env.step(&first, &Action::purchase(2.0, 5.0)).unwrap()
    }

    #[test]
    fn construction_rejects_bad_configs() {
        let mut cfg = desert_config();
        cfg.days = 0;
        assert!(Environment::new(&cfg).is_err());
    }

    #[test]
    fn initial_state_starts_at_the_start_node() {
        let env = env();
        let state = env.initial_state();
        assert_eq!(state.position, "a");
        assert!((state.cash - 600.0).abs() < f64::EPSILON);
        assert_eq!(env.start_node(), "a");
        assert_eq!(env.end_node(), "c");
    }

    #[test]
    fn purchase_at_injected_supply_debits_default_prices() {
        let env = env();
        let state = env
            .step(&env.initial_state(), &Action::purchase(5.0, 5.0))
            .unwrap();
        // 5 food at 8.0 plus 5 water at 5.0, then one day of consumption.
        assert!((state.cash - (600.0 - 65.0)).abs() < 1e-9);
        assert!((state.food - 3.0).abs() < 1e-9);
        assert!((state.water - 2.0).abs() < 1e-9);
        assert_eq!(state.day, 2);
    }

    #[test]
    fn mixed_purchase_debits_both_posted_prices() {
        let env = env();
        let state = env
            .step(&stocked(&env), &Action::purchase(5.0, 2.0))
            .unwrap();
        assert!((state.cash - (494.0 - (5.0 * 8.0 + 2.0 * 5.0))).abs() < 1e-9);
        assert!((state.food - 6.0).abs() < 1e-9);
        assert!((state.water - 3.0).abs() < 1e-9);
    }

    #[test]
    fn explicit_supply_prices_are_preserved() {
        let mut cfg = desert_config();
        if let Some(node) = cfg.map.nodes.get_mut("a") {
            node.supply = Some(SupplyPoint::buy_only(2.0, 1.0));
        }
        let env = Environment::new(&cfg).unwrap();
        let state = env
            .step(&env.initial_state(), &Action::purchase(5.0, 5.0))
            .unwrap();
        assert!((state.cash - (600.0 - (5.0 * 2.0 + 5.0 * 1.0))).abs() < 1e-9);
    }

    #[test]
    fn resting_with_empty_bag_starves() {
        let env = env();
        assert_eq!(env.step(&env.initial_state(), &Action::Rest), None);
    }

    #[test]
    fn horizon_exhaustion_is_infeasible() {
        let env = env();
        let mut state = stocked(&env);
        state.day = 6;
        assert_eq!(env.step(&state, &Action::Rest), None);
    }

    #[test]
    fn moves_require_adjacency() {
        let env = env();
        let state = stocked(&env);
        assert!(
            env.step(&state, &Action::move_to("c".to_string()))
                .is_none()
        );
        let moved = env
            .step(&state, &Action::move_to("b".to_string()))
            .unwrap();
        assert_eq!(moved.position, "b");
        assert!((moved.history[2].move_dist - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn sandstorm_caps_travel_distance() {
        let mut cfg = desert_config();
        cfg.map = MapGraph::new(
            vec![
                MapNode::new("a", "Camp", NodeKind::Start),
                MapNode::new("b", "Oasis", NodeKind::End),
            ],
            vec![MapEdge::new("a", "b", 8.0)],
        )
        .unwrap();
        cfg.day_conditions = DayCondition::sequence(vec![
            WEATHER_SAND.to_string(),
            WEATHER_SUNNY.to_string(),
            WEATHER_SUNNY.to_string(),
            WEATHER_SUNNY.to_string(),
            WEATHER_SUNNY.to_string(),
        ]);
        let env = Environment::new(&cfg).unwrap();
        // The sandstorm day drinks 4.5 water, so top up once more before
        // moving.
        let state = env
            .step(&stocked(&env), &Action::purchase(2.0, 5.0))
            .unwrap();
        // Day 4 is sunny: 8.0 within 12.0.
        let moved = env
            .step(&state, &Action::move_to("b".to_string()))
            .unwrap();
        assert!((moved.water - 1.5).abs() < 1e-9);
        // Day 1 is sandstorm: max travel 6.0, edge 8.0.
        assert_eq!(
            env.step(&env.initial_state(), &Action::move_to("b".to_string())),
            None
        );
    }

    #[test]
    fn unknown_weather_tag_uses_identity_rates() {
        let mut cfg = desert_config();
        cfg.day_conditions[0].weather = "Fog".to_string();
        let env = Environment::new(&cfg).unwrap();
        let state = env
            .step(&env.initial_state(), &Action::purchase(5.0, 5.0))
            .unwrap();
        assert!((state.food - 3.0).abs() < 1e-9);
        assert!((state.water - 2.0).abs() < 1e-9);
        assert_eq!(state.history[0].weather, "Fog");
    }

    #[test]
    fn empty_tag_reads_as_sunny_but_records_raw() {
        let mut cfg = desert_config();
        cfg.day_conditions[0].weather = String::new();
        let env = Environment::new(&cfg).unwrap();
        let state = env
            .step(&env.initial_state(), &Action::purchase(5.0, 5.0))
            .unwrap();
        assert!((state.food - 3.0).abs() < 1e-9);
        assert!(state.history[0].weather.is_empty());
    }

    #[test]
    fn selling_without_a_price_moves_goods_but_not_cash() {
        let mut cfg = desert_config();
        if let Some(node) = cfg.map.nodes.get_mut("a") {
            node.supply = Some(SupplyPoint::buy_only(8.0, 5.0));
        }
        let env = Environment::new(&cfg).unwrap();
        let state = env
            .step(&env.initial_state(), &Action::purchase(5.0, 5.0))
            .unwrap();
        let sold = env
            .step(
                &state,
                &Action::Trade {
                    buy_food: 0.0,
                    buy_water: 2.0,
                    sell_food: 1.0,
                    sell_water: 0.0,
                },
            )
            .unwrap();
        // Food leaves the bag with no credit; water purchase still debits.
        assert!((sold.food - (3.0 - 1.0 - 2.0)).abs() < 1e-9);
        assert!((sold.cash - (state.cash - 2.0 * 5.0)).abs() < 1e-9);
    }

    #[test]
    fn configured_sell_price_credits_cash() {
        let mut cfg = desert_config();
        if let Some(node) = cfg.map.nodes.get_mut("a") {
            node.supply = Some(SupplyPoint {
                buy_price_food: 8.0,
                buy_price_water: 5.0,
                sell_price_food: Some(6.0),
                sell_price_water: None,
            });
        }
        let env = Environment::new(&cfg).unwrap();
        let state = env
            .step(&env.initial_state(), &Action::purchase(5.0, 5.0))
            .unwrap();
        let sold = env
            .step(
                &state,
                &Action::Trade {
                    buy_food: 0.0,
                    buy_water: 2.0,
                    sell_food: 1.0,
                    sell_water: 0.0,
                },
            )
            .unwrap();
        // One food sold at 6.0, two water bought at 5.0.
        assert!((sold.cash - (state.cash + 6.0 - 10.0)).abs() < 1e-9);
    }

    #[test]
    fn overweight_loads_are_rejected() {
        let mut cfg = desert_config();
        cfg.bag.max_weight = 20.0;
        let env = Environment::new(&cfg).unwrap();
        // 5 food (15.0) plus 2 water (10.0) exceeds the 20.0 cap.
        assert_eq!(
            env.step(&env.initial_state(), &Action::purchase(5.0, 2.0)),
            None
        );
    }

    #[test]
    fn trading_at_a_supplyless_node_leaves_cash_alone() {
        let env = env();
        let state = stocked(&env);
        let at_b = env
            .step(&state, &Action::move_to("b".to_string()))
            .unwrap();
        let traded = env.step(&at_b, &Action::purchase(2.0, 2.0)).unwrap();
        assert!((traded.cash - at_b.cash).abs() < f64::EPSILON);
        assert!((traded.food - (at_b.food + 2.0 - 2.0)).abs() < 1e-9);
    }

    #[test]
    fn cash_may_go_negative() {
        let mut cfg = desert_config();
        cfg.economy.initial_cash = 10.0;
        let env = Environment::new(&cfg).unwrap();
        let state = env
            .step(&env.initial_state(), &Action::purchase(5.0, 5.0))
            .unwrap();
        assert!(state.cash < 0.0);
    }

    #[test]
    fn history_appends_without_touching_the_predecessor() {
        let env = env();
        let state = stocked(&env);
        let before = state.history.clone();
        let next = env.step(&state, &Action::Rest).unwrap();
        assert_eq!(state.history, before);
        assert_eq!(next.history.len(), state.history.len() + 1);
        assert_eq!(next.day, state.day + 1);
        let record = next.history.last().unwrap();
        assert_eq!(record.day, state.day);
        assert_eq!(record.pos, "a");
        assert_eq!(record.next_pos, "a");
    }

    #[test]
    fn candidate_actions_are_bounded_and_ordered() {
        let env = env();
        let at_start = env.candidate_actions(&env.initial_state());
        // Rest, one neighbor, nine purchase combinations.
        assert_eq!(at_start.len(), 11);
        assert_eq!(at_start[0], Action::Rest);
        assert_eq!(at_start[1], Action::move_to("b".to_string()));
        let trades = at_start
            .iter()
            .filter(|a| matches!(a, Action::Trade { .. }))
            .count();
        assert_eq!(trades, 9);

        let mut wanderer = env.initial_state();
        wanderer.position = "b".to_string();
        let at_b = env.candidate_actions(&wanderer);
        // No supply at a normal node: rest plus two neighbors.
        assert_eq!(at_b.len(), 3);
    }

    #[test]
    fn reached_end_is_kind_based() {
        let env = env();
        let mut state = env.initial_state();
        assert!(!env.reached_end(&state));
        state.position = "c".to_string();
        assert!(env.reached_end(&state));
    }
}
