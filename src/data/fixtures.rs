//! Small in-memory sales files shared by the unit tests.

use super::Dataset;

pub(crate) const HEADER: &str = "Row ID,Order ID,Order Date,Ship Mode,State,Region,Category,Sub-Category,Product Name,Sales,Quantity,Discount,Profit";

/// One sales line; fields not set by the constructors take neutral values.
#[derive(Clone)]
pub(crate) struct TestRow {
    pub order_id: String,
    pub order_date: &'static str,
    pub ship_mode: &'static str,
    pub state: &'static str,
    pub region: &'static str,
    pub category: &'static str,
    pub sub_category: &'static str,
    pub product: String,
    pub sales: f64,
    pub discount: f64,
    pub profit: f64,
}

impl TestRow {
    pub fn new(region: &'static str, product: &str, sales: f64, profit: f64) -> Self {
        Self {
            order_id: format!("ORD-{product}"),
            order_date: "1/1/2017",
            ship_mode: "Standard Class",
            state: "Ohio",
            region,
            category: "Technology",
            sub_category: "Phones",
            product: product.to_string(),
            sales,
            discount: 0.0,
            profit,
        }
    }

    pub fn order(mut self, order_id: &str) -> Self {
        self.order_id = order_id.to_string();
        self
    }

    pub fn category(mut self, category: &'static str) -> Self {
        self.category = category;
        self
    }

    pub fn date(mut self, order_date: &'static str) -> Self {
        self.order_date = order_date;
        self
    }
}

pub(crate) fn csv_text(rows: &[TestRow]) -> String {
    let mut text = String::from(HEADER);
    text.push('\n');
    for (i, r) in rows.iter().enumerate() {
        text.push_str(&format!(
            "{},{},{},{},{},{},{},{},\"{}\",{},1,{},{}\n",
            i + 1,
            r.order_id,
            r.order_date,
            r.ship_mode,
            r.state,
            r.region,
            r.category,
            r.sub_category,
            r.product.replace('"', "\"\""),
            r.sales,
            r.discount,
            r.profit,
        ));
    }
    text
}

pub(crate) fn dataset_from(rows: &[TestRow]) -> Dataset {
    Dataset::from_csv_text(&csv_text(rows), "test.csv", "%m/%d/%Y").unwrap()
}

/// A slice of the public Superstore file plus one zero-sales line in an
/// unmapped state.
pub(crate) fn sample_csv() -> String {
    format!(
        "{HEADER}
1,CA-2016-152156,11/8/2016,Second Class,Kentucky,South,Furniture,Bookcases,Bush Somerset Collection Bookcase,261.96,2,0,41.9136
2,CA-2016-152156,11/8/2016,Second Class,Kentucky,South,Furniture,Chairs,\"Hon Deluxe Fabric Upholstered Stacking Chairs, Rounded Back\",731.94,3,0,219.582
3,CA-2016-138688,6/12/2016,Second Class,California,West,Office Supplies,Labels,Self-Adhesive Address Labels for Typewriters by Universal,14.62,2,0,6.8714
4,US-2015-108966,10/11/2015,Standard Class,Florida,South,Furniture,Tables,Bretford CR4500 Series Slim Rectangular Table,957.5775,5,0.45,-383.031
5,US-2015-108966,10/11/2015,Standard Class,Florida,South,Office Supplies,Storage,Eldon Fold 'N Roll Cart System,22.368,2,0.2,2.5164
6,CA-2014-115812,6/9/2014,Standard Class,California,West,Furniture,Furnishings,\"Eldon Expressions Wood and Plastic Desk Accessories, Cherry Wood\",48.86,7,0,14.1694
7,CA-2014-115812,6/9/2014,Standard Class,California,West,Technology,Phones,Mitel 5320 IP Phone VoIP phone,907.152,6,0.2,90.7152
8,CA-2017-100006,9/7/2017,Standard Class,New York,East,Technology,Phones,AT&T EL51110 DECT,377.97,3,0,109.6113
9,CA-2017-100007,9/7/2017,First Class,District of Columbia,East,Technology,Accessories,Logitech G600 MMO Gaming Mouse,0,1,0,20
"
    )
}

pub(crate) fn sample_dataset() -> Dataset {
    Dataset::from_csv_text(&sample_csv(), "sample.csv", "%m/%d/%Y").unwrap()
}
