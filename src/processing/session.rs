//! Calculator session: one tree, its labels and display settings.
//!
//! Every mutation runs to completion before anything reads the session.
//! Questions for the user (such as "reset your divisions?") are passed in
//! as synchronous `confirm` callbacks.

use crate::config::Config;
use crate::error::{Result, SubnetError};
use crate::models::{format_address, Ipv4, Label, LabelMap};
use crate::output::Columns;
use crate::processing::tree::{build_tree, Tree};
use reqwest::Url;
use std::collections::HashMap;
use std::net::Ipv4Addr;

/// What [`Session::update_network`] did with the base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseChange {
    /// Same base as before; tree kept.
    Unchanged,
    /// New base; tree and labels replaced.
    Reset,
    /// New base refused by the confirm gate; nothing changed.
    Declined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Aligned network when the entered address had host bits set.
    pub corrected: Option<Ipv4Addr>,
    pub change: BaseChange,
}

/// Display settings the presentation layer reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplaySettings {
    pub binary_format: bool,
    pub columns: Columns,
}

#[derive(Debug, Clone)]
pub struct Session {
    tree: Tree,
    labels: LabelMap,
    pub display: DisplaySettings,
}

impl Session {
    /// Fresh single-leaf session on `base`.
    pub fn new(base: Ipv4) -> Result<Session> {
        Ok(Session {
            tree: Tree::new(base)?,
            labels: LabelMap::new(),
            display: DisplaySettings::default(),
        })
    }

    /// Session on the configured base network.
    pub fn from_config(config: &Config) -> Result<Session> {
        let outcome = build_tree(&config.network, &config.mask)?;
        let mut session = Session::new(outcome.tree.base())?;
        session.display.binary_format = config.binary;
        Ok(session)
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn labels(&self) -> &LabelMap {
        &self.labels
    }

    pub fn base(&self) -> Ipv4 {
        self.tree.base()
    }

    /// True when there is nothing a base change would throw away.
    pub fn is_pristine(&self) -> bool {
        self.tree.root().is_leaf() && self.labels.is_empty()
    }

    /// Apply a new base network and mask from user input.
    ///
    /// A changed base replaces the tree. When there are divisions or labels
    /// to lose, `confirm(old, new)` decides; a refusal leaves the session
    /// untouched.
    pub fn update_network<F>(
        &mut self,
        network_text: &str,
        mask_text: &str,
        confirm: F,
    ) -> Result<UpdateOutcome>
    where
        F: FnOnce(&Ipv4, &Ipv4) -> bool,
    {
        let outcome = build_tree(network_text, mask_text)?;
        let corrected = outcome.corrected();
        let old = self.base();
        let new = outcome.tree.base();

        let change = if new == old {
            BaseChange::Unchanged
        } else if self.is_pristine() || confirm(&old, &new) {
            log::info!("#Start new base {new} (was {old})");
            self.tree = outcome.tree;
            self.labels.clear();
            BaseChange::Reset
        } else {
            log::info!("base change {old} -> {new} declined");
            BaseChange::Declined
        };
        Ok(UpdateOutcome { corrected, change })
    }

    /// Back to a single leaf on the current base, labels cleared.
    pub fn start_over(&mut self) {
        log::info!("#Start over on {}", self.base());
        self.tree.reset();
        self.labels.clear();
    }

    /// Replace the tree with the division in `token`, keeping the base.
    /// A malformed token leaves a single leaf.
    pub fn load_token(&mut self, token: &str) -> Result<()> {
        self.tree = Tree::from_token(self.base(), token)?;
        self.labels.retain_leaves(&self.tree.leaf_keys());
        Ok(())
    }

    pub fn divide(&mut self, subnet: &Ipv4) -> Result<()> {
        self.tree.divide(subnet)
    }

    /// Join `subnet` and drop labels of the leaves that disappeared.
    pub fn join(&mut self, subnet: &Ipv4) -> Result<()> {
        self.tree.join(subnet)?;
        self.labels.retain_leaves(&self.tree.leaf_keys());
        Ok(())
    }

    /// Put palette label `name` on the leaf at `subnet`.
    pub fn assign_label(&mut self, subnet: &Ipv4, name: &str) -> Result<&Label> {
        if !self.tree.node(subnet)?.is_leaf() {
            return Err(SubnetError::InvalidOperation(format!(
                "{subnet} is divided, only leaves take labels"
            )));
        }
        self.labels.assign(&subnet.key(), name)
    }

    pub fn remove_label(&mut self, subnet: &Ipv4) -> Option<Label> {
        self.labels.remove(&subnet.key())
    }

    pub fn clear_labels(&mut self) {
        self.labels.clear();
    }

    /// Share link carrying base, division token and labels.
    pub fn share_link(&self, base_url: &str) -> Result<String> {
        let mut url = Url::parse(base_url)
            .map_err(|e| SubnetError::Parse(format!("base url '{base_url}': {e}")))?;
        {
            let mut query = url.query_pairs_mut();
            query
                .clear()
                .append_pair("network", &format_address(self.base().bits()))
                .append_pair("mask", &self.base().mask.to_string())
                .append_pair("division", &self.tree.to_token());
            if !self.labels.is_empty() {
                query.append_pair("labels", &self.labels.to_json()?);
            }
        }
        Ok(url.to_string())
    }

    /// Restore a session from a share link or bare `?query`.
    ///
    /// Without `network`, `mask` and `division` the session starts fresh on
    /// `fallback`. A bad division token or bad labels degrade instead of
    /// failing.
    pub fn from_share_link(link: &str, fallback: Ipv4) -> Result<Session> {
        let params = query_params(link)?;
        let (network, mask, division) = match (
            params.get("network"),
            params.get("mask"),
            params.get("division"),
        ) {
            (Some(n), Some(m), Some(d)) => (n, m, d),
            _ => {
                log::info!("share link without division, starting on {fallback}");
                return Session::new(fallback);
            }
        };

        let outcome = build_tree(network, mask)?;
        let mut session = Session::new(outcome.tree.base())?;
        session.load_token(division)?;

        if let Some(json) = params.get("labels") {
            match LabelMap::from_json(json) {
                Ok(labels) => {
                    session.labels = labels;
                    session.labels.retain_leaves(&session.tree.leaf_keys());
                }
                Err(e) => log::warn!("ignoring labels from link: {e}"),
            }
        }
        Ok(session)
    }
}

fn query_params(link: &str) -> Result<HashMap<String, String>> {
    let url = Url::parse(link)
        .or_else(|_| Url::parse("http://localhost/").and_then(|base| base.join(link)))
        .map_err(|e| SubnetError::Parse(format!("share link '{link}': {e}")))?;
    Ok(url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect())
}
