use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Legacy card name; clients use it to find the card again on update.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<CardHeader>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<Section>,
}

impl Card {
    pub fn new(header: CardHeader) -> Self {
        Card {
            name: None,
            header: Some(header),
            sections: Vec::new(),
        }
    }

    pub fn named<T: Into<String>>(mut self, name: T) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }
}

/// cardsV2 entry: a card plus the id the client uses to update it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardWithId {
    pub card_id: String,
    pub card: Card,
}

impl CardWithId {
    pub fn new<T: Into<String>>(card_id: T, card: Card) -> Self {
        CardWithId {
            card_id: card_id.into(),
            card,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImageStyle {
    Image,
    Avatar,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardHeader {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_style: Option<ImageStyle>,
}

impl CardHeader {
    pub fn titled<T: Into<String>>(title: T) -> Self {
        CardHeader {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_subtitle<T: Into<String>>(mut self, subtitle: T) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn with_image<T: Into<String>>(mut self, url: T, style: ImageStyle) -> Self {
        self.image_url = Some(url.into());
        self.image_style = Some(style);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Section {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    pub widgets: Vec<Widget>,
}

impl Section {
    pub fn new(widgets: Vec<Widget>) -> Self {
        Section {
            header: None,
            widgets,
        }
    }

    pub fn with_header<T: Into<String>>(mut self, header: T) -> Self {
        self.header = Some(header.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Icon {
    #[serde(rename = "knownIcon")]
    pub known_icon: String,
}

impl Icon {
    pub fn known<T: Into<String>>(name: T) -> Self {
        Icon {
            known_icon: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Widget {
    TextParagraph {
        text: String,
    },
    KeyValue {
        #[serde(skip_serializing_if = "Option::is_none")]
        top_label: Option<String>,
        content: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        bottom_label: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        icon: Option<String>,
    },
    DecoratedText {
        #[serde(skip_serializing_if = "Option::is_none")]
        top_label: Option<String>,
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        start_icon: Option<Icon>,
    },
    Image {
        image_url: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        on_click: Option<OnClick>,
    },
    Buttons(Vec<Button>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Button {
    TextButton { text: String, on_click: OnClick },
    ImageButton { icon: String, on_click: OnClick },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OnClick {
    Action(ClickAction),
    OpenLink(OpenLink),
}

impl OnClick {
    pub fn open_link<T: Into<String>>(url: T) -> Self {
        OnClick::OpenLink(OpenLink { url: url.into() })
    }

    /// Click that fires `method` back at the app with a single key/value parameter.
    pub fn action<M, K, V>(method: M, key: K, value: V) -> Self
    where
        M: Into<String>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::action_with_parameters(method, vec![(key, value)])
    }

    pub fn action_with_parameters<M, K, V>(method: M, parameters: Vec<(K, V)>) -> Self
    where
        M: Into<String>,
        K: Into<String>,
        V: Into<String>,
    {
        OnClick::Action(ClickAction {
            action_method_name: method.into(),
            parameters: parameters
                .into_iter()
                .map(|(key, value)| ClickParameter {
                    key: key.into(),
                    value: value.into(),
                })
                .collect(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenLink {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickAction {
    pub action_method_name: String,
    pub parameters: Vec<ClickParameter>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClickParameter {
    pub key: String,
    pub value: String,
}
