use gatherer_core::{ColorCounts, CreatureAction, Inventory, JewelColor, Leaflet};

#[test]
fn inventory_covers_leaflet_per_color() {
    let leaflet = Leaflet::new(
        "L1",
        ColorCounts::from_pairs([(JewelColor::Red, 2), (JewelColor::Blue, 1)]),
        true,
    );

    let mut inv = Inventory::default();
    inv.jewels[JewelColor::Red] = 2;
    assert!(!inv.can_satisfy(&leaflet));

    inv.jewels[JewelColor::Blue] = 3;
    assert!(inv.can_satisfy(&leaflet));
}

#[test]
fn deficit_is_signed() {
    let need = ColorCounts::from_pairs([(JewelColor::Green, 1)]);
    let have = ColorCounts::from_pairs([(JewelColor::Green, 3), (JewelColor::White, 1)]);
    let d = need.deficit(&have);
    assert_eq!(d[JewelColor::Green.index()], -2);
    assert_eq!(d[JewelColor::White.index()], -1);
    assert_eq!(d[JewelColor::Red.index()], 0);
}

#[test]
fn color_names_parse_case_insensitively() {
    assert_eq!(JewelColor::from_name("magenta"), Some(JewelColor::Magenta));
    assert_eq!(JewelColor::from_name("Orange"), None);
}

#[test]
fn action_labels_parse_back() {
    for action in CreatureAction::ALL {
        assert_eq!(action.label().parse::<CreatureAction>(), Ok(action));
    }
    assert_eq!("go_jewel".parse::<CreatureAction>(), Ok(CreatureAction::GoToJewel));
    assert!("FLY".parse::<CreatureAction>().is_err());
}
