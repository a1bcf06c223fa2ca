//! The set of fields permitted at the current point of a submission
//!
//! Each field may appear at most once in a set, so accepting a field
//! removes it. The set is recreated whenever a part, a record or a table
//! starts.

use std::collections::HashSet;

use crate::lib::tag::{self, Part, Results, Tag};

/// Where in the submission the validator currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    /// before the first field
    Start,
    EventDetails,
    /// inside PLAYER LIST, before any PIN record
    PlayerList,
    /// inside a PIN record
    Pin,
    /// inside a results part, before any PIN1 record
    Results(Results),
    /// inside a PIN1 record
    Pin1(Results),
    /// after a COLUMN field, before TABLE START
    Columns,
    /// between TABLE START and TABLE END
    TableValues,
    Finish,
}

impl Context {
    /// Context opened by a part field
    pub fn of_part(part: Part) -> Self {
        match part {
            Part::EventDetails => Context::EventDetails,
            Part::PlayerList => Context::PlayerList,
            Part::Finish => Context::Finish,
            _ => match Results::from_part(part) {
                Some(kind) => Context::Results(kind),
                None => unreachable!(),
            },
        }
    }

    /// Fields permitted when this context is fresh
    pub fn permitted(self) -> HashSet<Tag> {
        use Tag::*;
        let mut set = HashSet::new();
        match self {
            Context::Start => {
                set.insert(EventDetails);
            }
            Context::EventDetails => {
                set.insert(PlayerList);
                set.insert(Finish);
                set.extend(tag::MANDATORY_EVENT_FIELDS);
                set.extend(tag::OPTIONAL_EVENT_FIELDS);
            }
            Context::PlayerList => {
                set.insert(Comment);
                set.insert(Pin);
                set.extend(tag::TERMINATORS);
            }
            Context::Pin => {
                set.extend(tag::FIELDS_IN_PLAYERS);
                set.extend(tag::TERMINATORS);
            }
            Context::Results(_) => {
                set.insert(Pin1);
                set.insert(WhiteOn);
                set.insert(ResultsDate);
                set.extend(tag::TERMINATORS);
            }
            Context::Pin1(kind) => {
                set.extend(kind.record_fields());
                set.extend(tag::TERMINATORS);
            }
            Context::Columns => {
                set.insert(Column);
                set.insert(TableStart);
            }
            Context::TableValues => {
                set.insert(TableEnd);
            }
            Context::Finish => (),
        }
        set
    }
}

/// What is wrong with an EVENT DETAILS part once it is complete
#[derive(Debug, Default, PartialEq, Eq)]
pub struct EventProblems {
    pub missing: Vec<Tag>,
    pub bad_time_limit: bool,
}

impl EventProblems {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && !self.bad_time_limit
    }
}

/// What is wrong with a PIN record once it is complete
#[derive(Debug, Default, PartialEq, Eq)]
pub struct PinProblems {
    /// neither or both of NAME and SURNAME
    pub name: bool,
    /// FORENAME or INITIALS alongside NAME
    pub name_parts: bool,
    /// no ECF CODE, no CLUB CODE, and no full club description
    pub unidentified_club: bool,
}

#[derive(Debug)]
pub struct Expected {
    context: Context,
    fields: HashSet<Tag>,
    /// MINUTES FOR GAME and MINUTES REST OF GAME count 2, session fields 1
    time_limit: u8,
    officer_addresses: usize,
    treasurer_addresses: usize,
}

impl Expected {
    pub fn new(context: Context) -> Self {
        Self {
            context,
            fields: context.permitted(),
            time_limit: 0,
            officer_addresses: 0,
            treasurer_addresses: 0,
        }
    }

    /// Forget every field seen in the current context
    pub fn reset(&mut self) {
        *self = Self::new(self.context);
    }

    pub fn context(&self) -> Context {
        self.context
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.fields.contains(&tag)
    }

    /// Accept `tag` if still expected
    ///
    /// `false` means the field is out of place in the submission
    pub fn remove(&mut self, tag: Tag) -> bool {
        self.fields.remove(&tag)
    }

    /// Accept a field and its alias, which is then no longer expected
    pub fn remove_aliased(&mut self, tag: Tag) -> bool {
        if !self.remove(tag) {
            return false;
        }
        if let Some(other) = tag.alias() {
            self.fields.remove(&other);
        }
        true
    }

    /// Accept RESULTS OFFICER ADDRESS or TREASURER ADDRESS, which may repeat
    pub fn remove_repeatable(&mut self, tag: Tag) -> bool {
        if !self.remove(tag) {
            return false;
        }
        self.fields.insert(tag);
        match tag {
            Tag::ResultsOfficerAddress => self.officer_addresses += 1,
            Tag::TreasurerAddress => self.treasurer_addresses += 1,
            _ => (),
        }
        true
    }

    /// Accept MINUTES FOR GAME, which rules out every session field
    pub fn remove_minutes_for_game(&mut self) -> bool {
        use Tag::*;
        if !self.remove(MinutesForGame) {
            return false;
        }
        for tag in tag::THREE_SESSION {
            self.fields.remove(tag);
        }
        self.time_limit += 2;
        true
    }

    /// Accept a MOVES/MINUTES FIRST/SECOND SESSION field
    ///
    /// These come in pairs, which is only checked at the end of the part.
    pub fn remove_session_field(&mut self, tag: Tag) -> bool {
        if !self.remove(tag) {
            return false;
        }
        self.fields.remove(&Tag::MinutesForGame);
        self.time_limit += 1;
        true
    }

    pub fn remove_minutes_rest_of_game(&mut self) -> bool {
        if !self.remove(Tag::MinutesRestOfGame) {
            return false;
        }
        self.fields.remove(&Tag::MinutesForGame);
        self.time_limit += 2;
        true
    }

    /// Check a complete EVENT DETAILS part
    pub fn event_problems(&self) -> EventProblems {
        let missing = tag::MANDATORY_EVENT_FIELDS
            .iter()
            .copied()
            .filter(|tag| match tag {
                Tag::ResultsOfficerAddress => self.officer_addresses == 0,
                Tag::TreasurerAddress => self.treasurer_addresses == 0,
                _ => self.contains(*tag),
            })
            .collect();
        EventProblems {
            missing,
            bad_time_limit: self.time_limit == 0 || self.time_limit % 2 == 1,
        }
    }

    /// Check a complete PIN record
    pub fn pin_problems(&self) -> PinProblems {
        use Tag::*;
        let used = |tag| !self.contains(tag);
        PinProblems {
            name: used(Name) == used(Surname),
            name_parts: used(Name) && (used(Forename) || used(Initials)),
            unidentified_club: !used(EcfCode)
                && !used(ClubCode)
                && !(used(ClubName) && used(ClubCounty)),
        }
    }

    /// Fields missing from a complete PIN1 record
    pub fn pin1_missing(&self) -> Vec<Tag> {
        [Tag::Score, Tag::Pin2]
            .iter()
            .copied()
            .filter(|tag| self.contains(*tag))
            .collect()
    }

    /// The fields still permitted, sorted by name for messages
    pub fn names(&self) -> Vec<&'static str> {
        let mut names = self.fields.iter().map(|tag| tag.name()).collect::<Vec<_>>();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use Tag::*;

    fn event_with(tags: &[Tag]) -> Expected {
        let mut exp = Expected::new(Context::EventDetails);
        for tag in tags {
            let ok = match tag {
                MinutesForGame => exp.remove_minutes_for_game(),
                MinutesRestOfGame => exp.remove_minutes_rest_of_game(),
                MovesFirstSession | MinutesFirstSession | MovesSecondSession
                | MinutesSecondSession => exp.remove_session_field(*tag),
                ResultsOfficerAddress | TreasurerAddress => exp.remove_repeatable(*tag),
                _ => exp.remove(*tag),
            };
            assert!(ok, "{} rejected", tag);
        }
        exp
    }

    #[test]
    fn each_field_once() {
        let mut exp = Expected::new(Context::Pin);
        assert!(exp.remove(Name));
        assert!(!exp.remove(Name));
        assert!(exp.remove(Pin));
        exp.reset();
        assert!(exp.remove(Name));
    }

    #[test]
    fn aliases_exclude_each_other() {
        let mut exp = Expected::new(Context::Pin);
        assert!(exp.remove_aliased(BcfCode));
        assert!(!exp.remove_aliased(EcfCode));
        assert!(exp.remove_aliased(Club));
        assert!(!exp.contains(ClubName));
    }

    #[test]
    fn addresses_repeat() {
        let mut exp = Expected::new(Context::EventDetails);
        assert!(exp.remove_repeatable(TreasurerAddress));
        assert!(exp.remove_repeatable(TreasurerAddress));
        assert!(exp.remove_repeatable(TreasurerAddress));
        assert!(exp.event_problems().missing.contains(&ResultsOfficerAddress));
        assert!(!exp.event_problems().missing.contains(&TreasurerAddress));
    }

    #[test]
    fn complete_event_details() {
        let mut tags = tag::MANDATORY_EVENT_FIELDS.to_vec();
        tags.push(MinutesForGame);
        assert!(event_with(&tags).event_problems().is_empty());
        let mut tags = tag::MANDATORY_EVENT_FIELDS.to_vec();
        tags.extend(tag::THREE_SESSION);
        assert!(event_with(&tags).event_problems().is_empty());
        let mut tags = tag::MANDATORY_EVENT_FIELDS.to_vec();
        tags.extend(tag::MULTI_SESSION);
        assert!(event_with(&tags).event_problems().is_empty());
        let mut tags = tag::MANDATORY_EVENT_FIELDS.to_vec();
        tags.extend(tag::TWO_SESSION);
        assert!(event_with(&tags).event_problems().is_empty());
    }

    #[test]
    fn time_limits() {
        let probs = event_with(&[EventCode]).event_problems();
        assert!(probs.bad_time_limit);
        assert_eq!(probs.missing.len(), tag::MANDATORY_EVENT_FIELDS.len() - 1);
        // unpaired session field
        assert!(event_with(&[MovesFirstSession]).event_problems().bad_time_limit);
        assert!(!event_with(&[MovesFirstSession, MinutesFirstSession]).event_problems().bad_time_limit);
        // MINUTES FOR GAME rules out sessions and conversely
        let mut exp = event_with(&[MinutesForGame]);
        assert!(!exp.remove_session_field(MovesFirstSession));
        assert!(!exp.remove_minutes_rest_of_game());
        let mut exp = event_with(&[MinutesRestOfGame]);
        assert!(!exp.remove_minutes_for_game());
    }

    #[test]
    fn player_names() {
        let mut exp = Expected::new(Context::Pin);
        assert!(exp.pin_problems().name);
        exp.remove(Name);
        assert_eq!(exp.pin_problems().name, false);
        exp.remove(Initials);
        assert!(exp.pin_problems().name_parts);
        let mut exp = Expected::new(Context::Pin);
        exp.remove(Surname);
        exp.remove(Initials);
        let probs = exp.pin_problems();
        assert!(!probs.name && !probs.name_parts);
        assert!(probs.unidentified_club);
        exp.remove_aliased(BcfCode);
        assert!(!exp.pin_problems().unidentified_club);
    }

    #[test]
    fn incomplete_results() {
        let mut exp = Expected::new(Context::Pin1(Results::Match));
        assert_eq!(exp.pin1_missing(), vec![Score, Pin2]);
        exp.remove(Score);
        assert_eq!(exp.pin1_missing(), vec![Pin2]);
        exp.remove(Pin2);
        assert!(exp.pin1_missing().is_empty());
        assert!(exp.remove(Board));
        assert!(!Expected::new(Context::Pin1(Results::Other)).contains(Board));
        assert!(Expected::new(Context::Pin1(Results::Section)).contains(Round));
    }
}
