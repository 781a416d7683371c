//! Property-based tests for the navigation state machine.

use proptest::prelude::*;

use super::controller::{NavAction, NavigationController};
use super::panel::{NAV_ITEMS, PanelId};

fn arb_panel() -> impl Strategy<Value = PanelId> {
    (1u8..=7).prop_map(|n| PanelId::from_number(n).expect("1..=7 maps to a panel"))
}

fn arb_action() -> impl Strategy<Value = NavAction> {
    prop_oneof![
        arb_panel().prop_map(|p| NavAction::Select(p.as_str().to_string())),
        "[a-z]{1,12}".prop_map(NavAction::Select),
        Just(NavAction::Next),
        Just(NavAction::Prev),
        Just(NavAction::ToggleSidebar),
        Just(NavAction::CloseSidebar),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every successful panel selection leaves the sidebar closed, and every
    /// failed action leaves the state untouched.
    #[test]
    fn action_sequences_preserve_invariants(
        actions in prop::collection::vec(arb_action(), 1..50)
    ) {
        let mut nav = NavigationController::new();
        for action in &actions {
            let before = nav.state();
            match nav.apply(action) {
                Ok(state) => {
                    prop_assert_eq!(state, nav.state());
                    if action.selects_panel() {
                        prop_assert!(!state.sidebar_open);
                    } else {
                        prop_assert_eq!(state.active_panel, before.active_panel);
                    }
                }
                Err(_) => prop_assert_eq!(nav.state(), before),
            }
            prop_assert!(NAV_ITEMS.iter().any(|item| item.id == nav.active_panel()));
        }
    }

    #[test]
    fn select_round_trips_wire_id(panel in arb_panel(), open in any::<bool>()) {
        let mut nav = NavigationController::new();
        if open {
            nav.toggle_sidebar();
        }
        prop_assert_eq!(nav.select_panel(panel.as_str()).unwrap(), panel);
        prop_assert_eq!(nav.current_panel_label().panel, panel);
        prop_assert!(!nav.sidebar_open());
    }

    #[test]
    fn next_then_prev_is_identity(panel in arb_panel()) {
        prop_assert_eq!(panel.next().prev(), panel);
        prop_assert_eq!(panel.prev().next(), panel);
    }

    #[test]
    fn seven_nexts_cycle(panel in arb_panel()) {
        let mut p = panel;
        for _ in 0..7 {
            p = p.next();
        }
        prop_assert_eq!(p, panel);
    }

    #[test]
    fn toggle_parity(toggles in 0usize..20) {
        let mut nav = NavigationController::new();
        for _ in 0..toggles {
            nav.toggle_sidebar();
        }
        prop_assert_eq!(nav.sidebar_open(), toggles % 2 == 1);
        prop_assert_eq!(nav.active_panel(), PanelId::Overview);
    }
}
