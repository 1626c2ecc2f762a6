//! pattern_templates round trip through JSON rows.

mod common;

use unicorn_core::types::{
    BaseTable, EntityType, Filter, FilterValue, OrderDirection, PatternTemplate,
};
use unicorn_storage::queries::catalog;

#[test]
fn stored_patterns_load_as_json_specs() {
    let dir = tempfile::tempdir().unwrap();
    let db = common::open_db(&dir);

    let pattern = PatternTemplate {
        pattern_id: "UNQ-H-0020".into(),
        name: "3-0 damage".into(),
        description_template: "{{player_name}} on 3-0".into(),
        entity_type: EntityType::Batter,
        base_table: BaseTable::PitchFacts,
        category: Some("COUNT".into()),
        enabled: true,
        filters: vec![Filter::eq("count_str", FilterValue::Text("3-0".into()))],
        order_direction: OrderDirection::Desc,
        metric: "hard_hit_rate".into(),
        metric_expr: None,
        target_sample: 20,
        min_sample: 5,
        unicorn_weight: 1.1,
        public_weight: None,
        complexity_score: Some(1),
        requires_count: true,
        count_value: Some("3-0".into()),
    };
    db.with_writer(|conn| catalog::upsert_pattern(conn, &pattern)).unwrap();
    db.with_writer(|conn| {
        conn.execute_batch(
            "INSERT INTO pattern_templates (pattern_id, name, description_template, entity_type,
                 base_table, filters_json, order_direction, metric)
             VALUES ('UNQ-BAD', 'bad', '', 'batter', 'pitch_facts', '{not json', 'desc', 'count_hr')",
        )
        .unwrap();
        Ok(())
    })
    .unwrap();

    let specs = db.with_reader(catalog::load_pattern_specs).unwrap();
    assert_eq!(specs.len(), 2);

    let bad = &specs[0];
    assert_eq!(bad["pattern_id"], "UNQ-BAD");
    assert!(serde_json::from_value::<PatternTemplate>(bad.clone()).is_err());

    let loaded: PatternTemplate = serde_json::from_value(specs[1].clone()).unwrap();
    assert_eq!(loaded, pattern);
}

#[test]
fn wrapped_and_bare_filter_lists_both_load() {
    let dir = tempfile::tempdir().unwrap();
    let db = common::open_db(&dir);
    common::exec(
        &db,
        r#"INSERT INTO pattern_templates (pattern_id, name, description_template, entity_type,
               base_table, filters_json, order_direction, metric)
           VALUES
             ('UNQ-H-0001', 'wrapped', '', 'batter', 'pitch_facts',
              '{"conditions":[{"field":"is_hr","op":"=","value":true}]}', 'desc', 'count_hr'),
             ('UNQ-H-0002', 'bare', '', 'batter', 'pitch_facts',
              '[{"field":"is_hr","op":"=","value":true}]', 'desc', 'count_hr'),
             ('UNQ-H-0003', 'empty wrapper', '', 'batter', 'pitch_facts',
              '{"conditions":[]}', 'desc', 'count_hr');"#,
    );

    let specs = db.with_reader(catalog::load_pattern_specs).unwrap();
    let patterns: Vec<PatternTemplate> = specs
        .into_iter()
        .map(|spec| serde_json::from_value(spec).unwrap())
        .collect();
    assert_eq!(patterns.len(), 3);

    let expected = vec![Filter::eq("is_hr", FilterValue::Bool(true))];
    assert_eq!(patterns[0].pattern_id, "UNQ-H-0001");
    assert_eq!(patterns[0].filters, expected);
    assert_eq!(patterns[1].filters, expected);
    assert!(patterns[2].filters.is_empty());
}
