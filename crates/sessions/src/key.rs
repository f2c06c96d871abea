use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// Identity of one ongoing exchange: a user talking in a channel of a team.
///
/// Serialised as `team:channel:user`. `%` and `:` inside a component are
/// percent-escaped so distinct identities never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConversationKey {
    pub team_id: String,
    pub channel: String,
    pub user: String,
}

impl ConversationKey {
    pub fn new(
        team_id: impl Into<String>,
        channel: impl Into<String>,
        user: impl Into<String>,
    ) -> Self {
        Self {
            team_id: team_id.into(),
            channel: channel.into(),
            user: user.into(),
        }
    }
}

fn escape(part: &str, out: &mut String) {
    for ch in part.chars() {
        match ch {
            '%' => out.push_str("%25"),
            ':' => out.push_str("%3A"),
            c => out.push(c),
        }
    }
}

fn unescape(part: &str) -> Option<String> {
    let mut out = String::with_capacity(part.len());
    let mut rest = part;
    while let Some(idx) = rest.find('%') {
        out.push_str(&rest[..idx]);
        let code = rest.get(idx + 1..idx + 3)?;
        match code {
            "25" => out.push('%'),
            "3A" | "3a" => out.push(':'),
            _ => return None,
        }
        rest = &rest[idx + 3..];
    }
    out.push_str(rest);
    Some(out)
}

impl fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = String::with_capacity(
            self.team_id.len() + self.channel.len() + self.user.len() + 2,
        );
        escape(&self.team_id, &mut s);
        s.push(':');
        escape(&self.channel, &mut s);
        s.push(':');
        escape(&self.user, &mut s);
        f.write_str(&s)
    }
}

impl FromStr for ConversationKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let (Some(team), Some(channel), Some(user), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(Error::invalid_key(s));
        };
        let decode = |p: &str| unescape(p).ok_or_else(|| Error::invalid_key(s));
        Ok(Self {
            team_id: decode(team)?,
            channel: decode(channel)?,
            user: decode(user)?,
        })
    }
}
