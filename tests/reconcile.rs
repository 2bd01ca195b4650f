use fastnum::{UD256, dec256, udec256};
use prize_reserve::{
    chart::{ChartData, SeriesLabel},
    reserve,
    testing::{self, DrawTxBuilder, PoolSnapshotBuilder, tokens},
    tracker::{RecomputePolicy, ReserveTracker},
};
use tokio_test::assert_ok;

fn three_draws() -> PoolSnapshotBuilder {
    PoolSnapshotBuilder::new()
        .instant(4_000, 1_710_000_000)
        .first_draw_opened_at(1_709_000_000)
        .draw(
            DrawTxBuilder::new(1)
                .block(1_000)
                .awarded_at(1_709_100_000)
                .auction_reward(tokens("1"))
                .award_reward(tokens("1"))
                .remaining_reserve(tokens("10"))
                .build(),
        )
        .draw(
            DrawTxBuilder::new(2)
                .block(2_000)
                .awarded_at(1_709_200_000)
                .no_auction()
                .award_reward(tokens("4"))
                .remaining_reserve(tokens("4"))
                .build(),
        )
        .draw(
            DrawTxBuilder::new(3)
                .block(3_000)
                .awarded_at(1_709_300_000)
                .auction_reward(tokens("0.5"))
                .award_reward(tokens("0.5"))
                .remaining_reserve(tokens("2"))
                .build(),
        )
        .manual(500, tokens("3"))
        .manual(1_000, tokens("2"))
        .manual(2_500, tokens("1"))
        .manual(3_500, tokens("0.25"))
        .backstop(1_500, tokens("6"))
        .backstop(3_000, tokens("1"))
        .pending_reserve(tokens("1.75"))
}

/// Draw 2 has no auction, its interval folds into draw 3.
#[test]
fn test_reconcile_multiple_draws() {
    let snapshot = three_draws().build();
    let series = assert_ok!(reserve::reconcile(&snapshot.inputs(1_710_000_000)));

    let labels: Vec<String> = series.iter().map(|p| p.label.to_string()).collect();
    assert_eq!(
        labels,
        vec!["Start-1709000000", "1-1709100000", "3-1709300000", "Now-1710000000"]
    );

    // [0, 1000)
    let first = &series[1];
    assert_eq!(first.manual, udec256!(3));
    assert_eq!(first.rewards, udec256!(2));
    assert_eq!(first.prize_backstops, UD256::ZERO);
    assert_eq!(first.buyback, udec256!(10));
    assert_eq!(first.liquidations, dec256!(9));

    // [1000, 3000)
    let third = &series[2];
    assert_eq!(third.label.draw_id(), Some(3));
    assert_eq!(third.manual, udec256!(3));
    assert_eq!(third.rewards, udec256!(1));
    assert_eq!(third.prize_backstops, udec256!(6));
    assert_eq!(third.buyback, udec256!(2));
    assert_eq!(third.liquidations, dec256!(6));

    // [3000, ∞)
    let now = &series[3];
    assert_eq!(now.reserve, udec256!(1.75));
    assert_eq!(now.manual, udec256!(0.25));
    assert_eq!(now.liquidations, dec256!(1.5));

    assert!(series.iter().all(|p| p.is_balanced()));
}

#[test]
fn test_tracker_follows_new_draws() {
    let mut tracker = ReserveTracker::new(RecomputePolicy::default());
    tracker.apply_snapshot(three_draws().build());
    tracker.set_clock(1_710_000_000);

    let before = assert_ok!(tracker.series()).unwrap();
    assert_eq!(before.points.len(), 4);

    let snapshot = three_draws()
        .draw(
            DrawTxBuilder::new(4)
                .block(3_800)
                .awarded_at(1_709_400_000)
                .auction_reward(tokens("0.25"))
                .award_reward(tokens("0.25"))
                .remaining_reserve(tokens("1"))
                .build(),
        )
        .pending_reserve(tokens("0"))
        .build();
    assert!(tracker.apply_snapshot(snapshot));

    let after = assert_ok!(tracker.series()).unwrap();
    assert_eq!(after.points.len(), 5);
    assert_eq!(
        after.point(&SeriesLabel::Draw {
            draw_id: 4,
            timestamp: 1_709_400_000
        })
        .map(|p| p.manual),
        Some(udec256!(0.25))
    );
    assert_eq!(after.points[4].manual, UD256::ZERO);
    assert_eq!(tracker.passes(), 2);
}

#[test]
fn test_chart_data_json() {
    let snapshot = three_draws().build();
    let data = ChartData {
        points: assert_ok!(reserve::reconcile(&snapshot.inputs(1_710_000_000))),
        prize_token: testing::prize_token(),
        burn_token: None,
    };

    let json = serde_json::to_value(&data).unwrap();
    let points = json["points"].as_array().unwrap();
    assert_eq!(points.len(), 4);
    assert_eq!(points[0]["name"], "Start-1709000000");
    assert_eq!(points[2]["name"], "3-1709300000");
    for key in [
        "reserve",
        "liquidations",
        "manual",
        "rewards",
        "prizeBackstops",
        "buyback",
    ] {
        assert!(points[1].get(key).is_some(), "missing {key}");
    }
    // Amounts hand over as plain decimal strings
    assert_eq!(points[1]["prizeBackstops"], "0");
    assert_eq!(points[1]["buyback"], "10");
    assert_eq!(points[1]["liquidations"], "9");
    assert_eq!(points[3]["reserve"], "1.75");
    assert_eq!(json["prizeToken"]["decimals"], testing::PRIZE_TOKEN_DECIMALS);
    assert!(json["burnToken"].is_null());

    let label: SeriesLabel = points[2]["name"].as_str().unwrap().parse().unwrap();
    assert_eq!(label.tooltip_label(), "Mar 1, 2024 (Draw #3)");
}
