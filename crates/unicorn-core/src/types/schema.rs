//! Typed schema of the fact tables a pattern may read from.
//!
//! Every filter and metric field is resolved against this schema before a
//! query is built; anything not listed here is an unknown field.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::pattern::EntityType;

/// Logical fact source a pattern reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseTable {
    /// One row per pitch.
    PitchFacts,
    /// One row per plate appearance.
    PaFacts,
}

/// Storage type of a field; decides which operands a filter may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    Int,
    Real,
    Text,
}

impl FieldKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Real => "real",
            Self::Text => "text",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int | Self::Real)
    }
}

/// Concept class of a field, used by the validator's banned-concept rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Concept {
    Outcome,
    BattedBall,
    PitchType,
    PitchVelocity,
    Location,
    Count,
    Workload,
    Situation,
    Venue,
    Schedule,
    HomeAway,
    Inning,
    Sequence,
    Weather,
}

impl Concept {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Outcome => "outcome",
            Self::BattedBall => "batted_ball",
            Self::PitchType => "pitch_type",
            Self::PitchVelocity => "pitch_velocity",
            Self::Location => "location",
            Self::Count => "count",
            Self::Workload => "workload",
            Self::Situation => "situation",
            Self::Venue => "venue",
            Self::Schedule => "schedule",
            Self::HomeAway => "home_away",
            Self::Inning => "inning",
            Self::Sequence => "sequence",
            Self::Weather => "weather",
        }
    }

    /// Concepts no pattern may filter on.
    pub fn is_banned(&self) -> bool {
        matches!(self, Self::Inning | Self::Sequence | Self::Weather)
    }

    /// Classify free text (a field name or a text operand) into a banned
    /// concept, if it names one.
    ///
    /// Matching is on whole words: the text is split on anything that is not
    /// alphanumeric, so `wind_speed` names weather while `windup` does not.
    /// A trailing plural `s` is accepted (`innings`).
    pub fn banned_in_text(text: &str) -> Option<Concept> {
        const TERMS: &[(&[&str], Concept)] = &[
            (&["inning"], Concept::Inning),
            (&["weather"], Concept::Weather),
            (&["wind"], Concept::Weather),
            (&["humidity"], Concept::Weather),
            (&["temperature"], Concept::Weather),
            (&["sequence"], Concept::Sequence),
            (&["after", "fouling"], Concept::Sequence),
            (&["after", "two"], Concept::Sequence),
            (&["prev"], Concept::Sequence),
            (&["previous"], Concept::Sequence),
        ];
        let lower = text.to_ascii_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        TERMS
            .iter()
            .find(|(term, _)| {
                words
                    .windows(term.len())
                    .any(|window| window.iter().zip(term.iter()).all(|(w, t)| word_matches(w, t)))
            })
            .map(|(_, concept)| *concept)
    }
}

fn word_matches(word: &str, term: &str) -> bool {
    word == term || word.strip_suffix('s') == Some(term)
}

impl fmt::Display for Concept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single filterable column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    /// Name used in pattern definitions.
    pub name: &'static str,
    /// Qualified SQL column (`f.` = fact table, `g.` = games).
    pub column: &'static str,
    pub kind: FieldKind,
    pub concept: Concept,
}

const fn field(
    name: &'static str,
    column: &'static str,
    kind: FieldKind,
    concept: Concept,
) -> FieldDef {
    FieldDef {
        name,
        column,
        kind,
        concept,
    }
}

use Concept as C;
use FieldKind as K;

static GAME_FIELDS: &[FieldDef] = &[
    field("games.venue_id", "g.venue_id", K::Int, C::Venue),
    field("games.is_day_game", "g.is_day_game", K::Bool, C::Schedule),
    field("games.is_night_game", "g.is_night_game", K::Bool, C::Schedule),
];

static PITCH_FIELDS: &[FieldDef] = &[
    field("pitch_type", "f.pitch_type", K::Text, C::PitchType),
    field("vel", "f.vel", K::Real, C::PitchVelocity),
    field("spin_rate", "f.spin_rate", K::Real, C::PitchVelocity),
    field("count_str", "f.count_str", K::Text, C::Count),
    field("count_balls_before", "f.count_balls_before", K::Int, C::Count),
    field("count_strikes_before", "f.count_strikes_before", K::Int, C::Count),
    field("is_in_zone", "f.is_in_zone", K::Bool, C::Location),
    field("loc_region", "f.loc_region", K::Text, C::Location),
    field("loc_high_mid_low", "f.loc_high_mid_low", K::Text, C::Location),
    field("loc_in_mid_out", "f.loc_in_mid_out", K::Text, C::Location),
    field("result_pitch", "f.result_pitch", K::Text, C::Outcome),
    field("is_last_pitch_of_pa", "f.is_last_pitch_of_pa", K::Bool, C::Outcome),
    field("pa_outcome", "f.pa_outcome", K::Text, C::Outcome),
    field("is_hr", "f.is_hr", K::Bool, C::Outcome),
    field("is_hit", "f.is_hit", K::Bool, C::Outcome),
    field("is_walk", "f.is_walk", K::Bool, C::Outcome),
    field("launch_speed", "f.launch_speed", K::Real, C::BattedBall),
    field("launch_angle", "f.launch_angle", K::Real, C::BattedBall),
    field("spray_angle", "f.spray_angle", K::Real, C::BattedBall),
    field("is_barrel", "f.is_barrel", K::Bool, C::BattedBall),
    field("is_hard_hit", "f.is_hard_hit", K::Bool, C::BattedBall),
    field("batted_ball_type", "f.batted_ball_type", K::Text, C::BattedBall),
    field("hit_direction", "f.hit_direction", K::Text, C::BattedBall),
    field("pitch_number_game", "f.pitch_number_game", K::Int, C::Workload),
    field("pitch_number_pa", "f.pitch_number_pa", K::Int, C::Sequence),
    field("inning", "f.inning", K::Int, C::Inning),
    field("top_bottom", "f.top_bottom", K::Text, C::HomeAway),
];

static PA_FIELDS: &[FieldDef] = &[
    field("result", "f.result", K::Text, C::Outcome),
    field("is_hit", "f.is_hit", K::Bool, C::Outcome),
    field("is_hr", "f.is_hr", K::Bool, C::Outcome),
    field("is_bb", "f.is_bb", K::Bool, C::Outcome),
    field("xwoba", "f.xwoba", K::Real, C::Outcome),
    field("bases_state_before", "f.bases_state_before", K::Text, C::Situation),
    field("outs_before", "f.outs_before", K::Int, C::Situation),
    field("score_diff_before", "f.score_diff_before", K::Int, C::Situation),
    field("bat_order", "f.bat_order", K::Int, C::Situation),
    field("is_risp", "f.is_risp", K::Bool, C::Situation),
    field("inning", "f.inning", K::Int, C::Inning),
    field("top_bottom", "f.top_bottom", K::Text, C::HomeAway),
];

impl BaseTable {
    /// Physical table name in the fact store.
    pub fn table_name(&self) -> &'static str {
        match self {
            Self::PitchFacts => "pitch_facts",
            Self::PaFacts => "pa_facts",
        }
    }

    /// Fields owned by this table (excluding joined game fields).
    pub fn own_fields(&self) -> &'static [FieldDef] {
        match self {
            Self::PitchFacts => PITCH_FIELDS,
            Self::PaFacts => PA_FIELDS,
        }
    }

    /// Look up a filterable field by its pattern-facing name.
    pub fn field(&self, name: &str) -> Option<&'static FieldDef> {
        self.own_fields()
            .iter()
            .chain(GAME_FIELDS.iter())
            .find(|f| f.name == name)
    }

    /// Grouping column for an entity type.
    pub fn entity_column(&self, entity_type: EntityType) -> &'static str {
        match entity_type {
            EntityType::Batter => "f.batter_id",
            EntityType::Pitcher => "f.pitcher_id",
        }
    }
}

impl fmt::Display for BaseTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_fields_available_on_both_tables() {
        for table in [BaseTable::PitchFacts, BaseTable::PaFacts] {
            let venue = table.field("games.venue_id").unwrap();
            assert_eq!(venue.column, "g.venue_id");
        }
    }

    #[test]
    fn test_table_specific_fields() {
        assert!(BaseTable::PitchFacts.field("is_barrel").is_some());
        assert!(BaseTable::PaFacts.field("is_barrel").is_none());
        assert!(BaseTable::PaFacts.field("xwoba").is_some());
    }

    #[test]
    fn test_banned_terms_in_text() {
        assert_eq!(Concept::banned_in_text("late innings"), Some(Concept::Inning));
        assert_eq!(Concept::banned_in_text("Wind_Speed"), Some(Concept::Weather));
        assert_eq!(Concept::banned_in_text("prev_pitch_type"), Some(Concept::Sequence));
        assert_eq!(Concept::banned_in_text("low_away"), None);
        assert_eq!(Concept::banned_in_text("after two strikes"), Some(Concept::Sequence));
        assert_eq!(Concept::banned_in_text("Temperature"), Some(Concept::Weather));
    }

    #[test]
    fn test_banned_terms_need_whole_words() {
        assert_eq!(Concept::banned_in_text("windup"), None);
        assert_eq!(Concept::banned_in_text("windup_release_ext"), None);
        assert_eq!(Concept::banned_in_text("preview_flag"), None);
        assert_eq!(Concept::banned_in_text("beginning_of_season"), None);
        assert_eq!(Concept::banned_in_text("two after"), None);
        assert_eq!(Concept::banned_in_text("wind-aided"), Some(Concept::Weather));
    }
}
