//! Field names of the ECF results submission format
//!
//! The format ignores case and whitespace in field names: `EVENT CODE`,
//! `eventcode` and `Event  Code` all name the same field. A `Tag` is matched
//! on that normalised form and displayed with its canonical name.

use std::fmt;
use std::str::FromStr;

macro_rules! tags {
    ( $( $variant:ident => $name:expr, )* ) => {
        /// Every field name known to the submission format
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Tag {
            $( $variant, )*
        }

        impl Tag {
            /// All tags in declaration order
            pub const ALL: &'static [Tag] = &[ $( Tag::$variant, )* ];

            /// Canonical field name, as written in the ECF field definitions
            pub fn name(self) -> &'static str {
                match self {
                    $( Tag::$variant => $name, )*
                }
            }
        }
    };
}

tags! {
    Adjudicated => "ADJUDICATED",
    BcfCode => "BCF CODE",
    BcfNo => "BCF NO",
    Board => "BOARD",
    Club => "CLUB",
    ClubCode => "CLUB CODE",
    ClubCounty => "CLUB COUNTY",
    ClubName => "CLUB NAME",
    Colour => "COLOUR",
    Column => "COLUMN",
    Comment => "COMMENT",
    DateOfBirth => "DATE OF BIRTH",
    EcfCode => "ECF CODE",
    EcfNo => "ECF NO",
    Environment => "ENVIRONMENT",
    EventCode => "EVENT CODE",
    EventDate => "EVENT DATE",
    EventDetails => "EVENT DETAILS",
    EventName => "EVENT NAME",
    FideNo => "FIDE NO",
    FinalResultDate => "FINAL RESULT DATE",
    Finish => "FINISH",
    Forename => "FORENAME",
    GameDate => "GAME DATE",
    Gender => "GENDER",
    InformChessmoves => "INFORM CHESSMOVES",
    InformFide => "INFORM FIDE",
    InformGrandPrix => "INFORM GRAND PRIX",
    InformUnion => "INFORM UNION",
    Initials => "INITIALS",
    MatchResults => "MATCH RESULTS",
    MinutesFirstSession => "MINUTES FIRST SESSION",
    MinutesForGame => "MINUTES FOR GAME",
    MinutesRestOfGame => "MINUTES REST OF GAME",
    MinutesSecondSession => "MINUTES SECOND SESSION",
    MovesFirstSession => "MOVES FIRST SESSION",
    MovesSecondSession => "MOVES SECOND SESSION",
    Name => "NAME",
    OtherResults => "OTHER RESULTS",
    Pin => "PIN",
    Pin1 => "PIN1",
    Pin2 => "PIN2",
    PlayerList => "PLAYER LIST",
    ResultsDate => "RESULTS DATE",
    ResultsDuplicated => "RESULTS DUPLICATED",
    ResultsOfficer => "RESULTS OFFICER",
    ResultsOfficerAddress => "RESULTS OFFICER ADDRESS",
    Round => "ROUND",
    Score => "SCORE",
    SecondsPerMove => "SECONDS PER MOVE",
    SectionResults => "SECTION RESULTS",
    SubmissionIndex => "SUBMISSION INDEX",
    Surname => "SURNAME",
    TableEnd => "TABLE END",
    TableStart => "TABLE START",
    Title => "TITLE",
    Treasurer => "TREASURER",
    TreasurerAddress => "TREASURER ADDRESS",
    WhiteOn => "WHITE ON",
}

/// Upper case with all whitespace removed
pub fn normalise(name: &str) -> String {
    name.split_whitespace().collect::<String>().to_uppercase()
}

impl FromStr for Tag {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, ()> {
        let key = normalise(s);
        Tag::ALL
            .iter()
            .copied()
            .find(|tag| normalise(tag.name()) == key)
            .ok_or(())
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Tag {
    /// Field is written `#NAME#`, never `#NAME=value#`
    pub fn without_value(self) -> bool {
        use Tag::*;
        matches!(
            self,
            EventDetails
                | Finish
                | PlayerList
                | TableStart
                | TableEnd
                | InformFide
                | InformChessmoves
                | InformGrandPrix
                | InformUnion
                | ResultsDuplicated
        )
    }

    /// Field begins a new line when a document is formatted
    pub fn starts_line(self) -> bool {
        use Tag::*;
        Part::from_tag(self).is_some()
            || matches!(self, Pin | Pin1 | WhiteOn | ResultsDate | TableStart | TableEnd | Column)
            || MANDATORY_EVENT_FIELDS.contains(&self)
            || OPTIONAL_EVENT_FIELDS.contains(&self)
    }

    /// The other member of an alias pair: using either removes both
    pub fn alias(self) -> Option<Tag> {
        use Tag::*;
        match self {
            EcfCode => Some(BcfCode),
            BcfCode => Some(EcfCode),
            EcfNo => Some(BcfNo),
            BcfNo => Some(EcfNo),
            ClubName => Some(Club),
            Club => Some(ClubName),
            _ => None,
        }
    }
}

/// The fields that delimit the parts of a submission, in the order
/// they appear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Part {
    EventDetails,
    PlayerList,
    MatchResults,
    OtherResults,
    SectionResults,
    Finish,
}

impl Part {
    pub fn tag(self) -> Tag {
        match self {
            Part::EventDetails => Tag::EventDetails,
            Part::PlayerList => Tag::PlayerList,
            Part::MatchResults => Tag::MatchResults,
            Part::OtherResults => Tag::OtherResults,
            Part::SectionResults => Tag::SectionResults,
            Part::Finish => Tag::Finish,
        }
    }

    pub fn from_tag(tag: Tag) -> Option<Self> {
        match tag {
            Tag::EventDetails => Some(Part::EventDetails),
            Tag::PlayerList => Some(Part::PlayerList),
            Tag::MatchResults => Some(Part::MatchResults),
            Tag::OtherResults => Some(Part::OtherResults),
            Tag::SectionResults => Some(Part::SectionResults),
            Tag::Finish => Some(Part::Finish),
            _ => None,
        }
    }
}

impl FromStr for Part {
    type Err = ();
    /// Accepts field names as well as `player-list`, `match_results`, ...
    fn from_str(s: &str) -> Result<Self, ()> {
        let name = s.replace(&['-', '_'][..], " ");
        name.parse::<Tag>().ok().and_then(Part::from_tag).ok_or(())
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// The three kinds of part that hold PIN1 records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Results {
    Match,
    Other,
    Section,
}

impl Results {
    pub fn part(self) -> Part {
        match self {
            Results::Match => Part::MatchResults,
            Results::Other => Part::OtherResults,
            Results::Section => Part::SectionResults,
        }
    }

    pub fn from_part(part: Part) -> Option<Self> {
        match part {
            Part::MatchResults => Some(Results::Match),
            Part::OtherResults => Some(Results::Other),
            Part::SectionResults => Some(Results::Section),
            _ => None,
        }
    }

    /// Fields permitted in a PIN1 record of this kind of part
    pub fn record_fields(self) -> &'static [Tag] {
        match self {
            Results::Match => FIELDS_IN_MATCH,
            Results::Other => FIELDS_IN_OTHER,
            Results::Section => FIELDS_IN_SECTION,
        }
    }
}

impl FromStr for Results {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, ()> {
        match s.to_lowercase().as_str() {
            "match" => Ok(Results::Match),
            "other" => Ok(Results::Other),
            "section" => Ok(Results::Section),
            _ => s.parse::<Part>().ok().and_then(Results::from_part).ok_or(()),
        }
    }
}

use Tag::*;

/// Must each appear in EVENT DETAILS, in this order when generated
pub const MANDATORY_EVENT_FIELDS: &[Tag] = &[
    EventCode,
    SubmissionIndex,
    EventName,
    EventDate,
    FinalResultDate,
    ResultsOfficer,
    ResultsOfficerAddress,
    Treasurer,
    TreasurerAddress,
];

/// May appear in EVENT DETAILS
///
/// Includes the time limit fields, of which one combination is mandatory,
/// and fields the ECF accepts but ignores.
pub const OPTIONAL_EVENT_FIELDS: &[Tag] = &[
    MinutesForGame,
    MovesFirstSession,
    MinutesFirstSession,
    MovesSecondSession,
    MinutesSecondSession,
    MinutesRestOfGame,
    Environment,
    InformGrandPrix,
    SecondsPerMove,
    Adjudicated,
    InformChessmoves,
    InformFide,
    InformUnion,
    ResultsDuplicated,
];

/// End a PIN or PIN1 record (and a table) without being part of it
pub const TERMINATORS: &[Tag] = &[Column, Finish, MatchResults, OtherResults, SectionResults];

pub const FIELDS_IN_PLAYERS: &[Tag] = &[
    Pin,
    EcfCode,
    Name,
    Surname,
    Forename,
    Initials,
    Gender,
    Title,
    DateOfBirth,
    ClubCode,
    ClubName,
    ClubCounty,
    EcfNo,
    FideNo,
    Comment,
    BcfCode,
    BcfNo,
    Club,
];

pub const FIELDS_IN_MATCH: &[Tag] = &[Pin1, Pin2, Score, Colour, Board, GameDate, Comment];
pub const FIELDS_IN_OTHER: &[Tag] = &[Pin1, Pin2, Score, Colour, GameDate, Comment];
pub const FIELDS_IN_SECTION: &[Tag] = &[Pin1, Pin2, Score, Colour, Round, GameDate, Comment];

/// Time limit field combinations, one of which EVENT DETAILS must hold
pub const ONE_SESSION: &[Tag] = &[MinutesForGame];
pub const TWO_SESSION: &[Tag] = &[MovesFirstSession, MinutesFirstSession, MinutesRestOfGame];
pub const MULTI_SESSION: &[Tag] = &[
    MovesFirstSession,
    MinutesFirstSession,
    MovesSecondSession,
    MinutesSecondSession,
];
pub const THREE_SESSION: &[Tag] = &[
    MovesFirstSession,
    MinutesFirstSession,
    MovesSecondSession,
    MinutesSecondSession,
    MinutesRestOfGame,
];

#[cfg(test)]
mod test {
    use super::*;

    macro_rules! reads {
        ( $s:expr => $tag:expr ) => {
            assert_eq!($s.parse::<Tag>(), Ok($tag));
        };
    }

    #[test]
    fn names_ignore_case_and_spaces() {
        reads!("EVENT CODE" => Tag::EventCode);
        reads!("eventcode" => Tag::EventCode);
        reads!("  Event \t Code " => Tag::EventCode);
        reads!("pin1" => Tag::Pin1);
        reads!("PIN 2" => Tag::Pin2);
        reads!("results officer address" => Tag::ResultsOfficerAddress);
        assert!("EVENT".parse::<Tag>().is_err());
        assert!("PINS".parse::<Tag>().is_err());
        assert!("".parse::<Tag>().is_err());
    }

    #[test]
    fn every_name_round_trips() {
        for tag in Tag::ALL {
            assert_eq!(tag.name().parse::<Tag>(), Ok(*tag));
        }
    }

    #[test]
    fn parts_from_command_line() {
        assert_eq!("player-list".parse::<Part>(), Ok(Part::PlayerList));
        assert_eq!("MATCH_RESULTS".parse::<Part>(), Ok(Part::MatchResults));
        assert_eq!("finish".parse::<Part>(), Ok(Part::Finish));
        assert!("pin".parse::<Part>().is_err());
        assert_eq!("section".parse::<Results>(), Ok(Results::Section));
        assert_eq!("other results".parse::<Results>(), Ok(Results::Other));
        assert!("player list".parse::<Results>().is_err());
    }

    #[test]
    fn line_starts() {
        assert!(Tag::Pin.starts_line());
        assert!(Tag::EventCode.starts_line());
        assert!(Tag::MinutesForGame.starts_line());
        assert!(!Tag::Name.starts_line());
        assert!(!Tag::Score.starts_line());
    }

    #[test]
    fn aliases_are_symmetric() {
        for tag in Tag::ALL {
            if let Some(other) = tag.alias() {
                assert_eq!(other.alias(), Some(*tag));
            }
        }
    }
}
