use chrono::NaiveDate;
use serde::Deserialize;

use crate::treemap::TreeNode;

/// Quarterly GDP series, `data` as `[date, billions]` pairs.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct GdpSeries {
    pub name: String,
    pub description: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub data: Vec<(NaiveDate, f64)>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct CyclistRecord {
    pub time: String,
    pub place: u32,
    pub seconds: f64,
    pub name: String,
    pub year: i32,
    pub nationality: String,
    /// Empty when there are no allegations.
    #[serde(default)]
    pub doping: String,
    #[serde(rename = "URL", default)]
    pub url: String,
}

impl CyclistRecord {
    pub fn has_allegations(&self) -> bool {
        !self.doping.trim().is_empty()
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureData {
    pub base_temperature: f64,
    pub monthly_variance: Vec<MonthlyVariance>,
}

/// `month` is 1-based as stored in the file.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct MonthlyVariance {
    pub year: i32,
    pub month: u32,
    pub variance: f64,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct EducationRecord {
    pub fips: i64,
    pub state: String,
    pub area_name: String,
    #[serde(rename = "bachelorsOrHigher")]
    pub bachelors_or_higher: f64,
}

/// Leaf values arrive as numbers or as numeric strings.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum HierarchyValue {
    Number(f64),
    Text(String),
}

impl HierarchyValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(text) => text.trim().parse().ok(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Hierarchy {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub value: Option<HierarchyValue>,
    #[serde(default)]
    pub children: Vec<Hierarchy>,
}

impl Hierarchy {
    /// Converts to a [`TreeNode`]; nodes without children are leaves and
    /// unreadable values count as zero.
    pub fn to_tree(&self) -> TreeNode {
        if self.children.is_empty() {
            let value = match &self.value {
                Some(raw) => raw.as_f64().unwrap_or_else(|| {
                    log::warn!("`{}` has a non-numeric value {raw:?}; using 0", self.name);
                    0.0
                }),
                None => 0.0,
            };
            return TreeNode::leaf(self.name.clone(), self.category.clone(), value);
        }

        TreeNode::branch(
            self.name.clone(),
            self.category.clone(),
            self.children.iter().map(Hierarchy::to_tree).collect(),
        )
    }
}

/// One lawsuit or licensing edge of the patent graph.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct SuitLink {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gdp_dates_parse() {
        let series: GdpSeries = serde_json::from_str(
            r#"{
                "name": "Gross Domestic Product",
                "description": "Units: Billions of Dollars",
                "from_date": "1947-01-01",
                "to_date": "2015-07-01",
                "source_name": "FRED",
                "data": [["1947-01-01", 243.1], ["1947-04-01", 246.3]]
            }"#,
        )
        .unwrap();
        assert_eq!(series.data.len(), 2);
        assert_eq!(series.data[1].0, NaiveDate::from_ymd_opt(1947, 4, 1).unwrap());
        assert_eq!(series.to_date.format("%Y").to_string(), "2015");
    }

    #[test]
    fn cyclist_fields_are_pascal_case() {
        let records: Vec<CyclistRecord> = serde_json::from_str(
            r#"[{"Time": "36:50", "Place": 1, "Seconds": 2210, "Name": "Marco Pantani",
                 "Year": 1995, "Nationality": "ITA", "Doping": "Alleged drug use", "URL": ""},
                {"Time": "39:23", "Place": 35, "Seconds": 2363, "Name": "Nairo Quintana",
                 "Year": 2015, "Nationality": "COL", "Doping": "", "URL": ""}]"#,
        )
        .unwrap();
        assert!(records[0].has_allegations());
        assert!(!records[1].has_allegations());
        assert_eq!(records[1].seconds, 2363.0);
    }

    #[test]
    fn hierarchy_reads_string_values() {
        let root: Hierarchy = serde_json::from_str(
            r#"{"name": "Movies", "children": [
                {"name": "Action", "children": [
                    {"name": "Avatar", "category": "Action", "value": "760505847"},
                    {"name": "Broken", "category": "Action", "value": "n/a"}
                ]},
                {"name": "Drama", "children": [
                    {"name": "Titanic", "category": "Drama", "value": 658672302}
                ]}
            ]}"#,
        )
        .unwrap();
        let tree = root.to_tree();
        assert_eq!(tree.value(), 760_505_847.0 + 658_672_302.0);
        assert_eq!(tree.children()[0].children()[1].value(), 0.0);
    }

    #[test]
    fn suit_type_field_is_renamed() {
        let link: SuitLink =
            serde_json::from_str(r#"{"source": "Apple", "target": "HTC", "type": "suit"}"#).unwrap();
        assert_eq!(link.kind, "suit");
    }
}
