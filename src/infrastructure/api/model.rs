//! Wire models of the workplace booking API.

use serde::{Deserialize, Serialize};

use crate::domain::model::{LocationId, TargetDate};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Reservable {
    pub capacity: i32,
    #[serde(rename = "KubeId")]
    pub kube_id: String,
    #[serde(rename = "cwmSpaceId")]
    pub cwm_space_id: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Address {
    pub line1: String,
    pub line2: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LocationDetails {
    pub uuid: String,
    pub name: String,
    pub description: String,
    pub currency: String,
    pub timezone_offset: String,
    pub time_zone_identifier: String,
    #[serde(rename = "timeZoneWinId")]
    pub time_zone_win_id: String,
    pub address: Address,
}

/// One bookable shared workspace returned by the catalog.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Workspace {
    pub uuid: String,
    pub inventory_uuid: String,
    pub reservable: Reservable,
    pub capacity: i32,
    pub credits: i32,
    pub seats_available: i32,
    pub location: LocationDetails,
    pub open_time: String,
    pub close_time: String,
    pub cancellation_policy: String,
}

impl Workspace {
    pub fn id(&self) -> LocationId {
        LocationId::new(self.uuid.clone())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SharedWorkspaces {
    pub workspaces: Vec<Workspace>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpacesResponse {
    pub limit: i32,
    pub offset: i32,
    pub get_shared_workspaces: SharedWorkspaces,
}

#[derive(Debug, Clone, Serialize)]
pub struct MailData {
    #[serde(rename = "dayFormatted")]
    pub day_formatted: String,
    #[serde(rename = "startTimeFormatted")]
    pub start_time_formatted: String,
    #[serde(rename = "endTimeFormatted")]
    pub end_time_formatted: String,
    #[serde(rename = "locationAddress")]
    pub location_address: String,
    #[serde(rename = "creditsUsed")]
    pub credits_used: String,
    #[serde(rename = "Capacity")]
    pub capacity: String,
    #[serde(rename = "TimezoneUsed")]
    pub timezone_used: String,
    #[serde(rename = "TimezoneIana")]
    pub timezone_iana: String,
    #[serde(rename = "TimezoneWin")]
    pub timezone_win: String,
    #[serde(rename = "startDateTime")]
    pub start_date_time: String,
    #[serde(rename = "endDateTime")]
    pub end_date_time: String,
    #[serde(rename = "locationName")]
    pub location_name: String,
    #[serde(rename = "locationCity")]
    pub location_city: String,
    #[serde(rename = "locationCountry")]
    pub location_country: String,
    #[serde(rename = "locationState")]
    pub location_state: String,
}

/// Body of a day-pass desk booking.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BookingRequest {
    pub application_type: String,
    pub platform_type: String,
    pub space_type: i32,
    #[serde(rename = "ReservationID")]
    pub reservation_id: String,
    pub trigger_calendar_event: bool,
    pub mail_data: MailData,
    pub location_type: i32,
    #[serde(rename = "UTCOffset")]
    pub utc_offset: String,
    pub credit_ratio: i32,
    #[serde(rename = "LocationID")]
    pub location_id: String,
    #[serde(rename = "SpaceID")]
    pub space_id: String,
    #[serde(rename = "WeWorkSpaceID")]
    pub wework_space_id: String,
    pub start_time: String,
    pub end_time: String,
}

const DESK_SPACE_TYPE: i32 = 4;
const SHARED_LOCATION_TYPE: i32 = 2;
const CREDIT_RATIO: i32 = 20;
const DAY_PASS_CREDITS: &str = "2";

impl BookingRequest {
    /// Full-day desk booking for `space` on `date`.
    pub fn day_pass(space: &Workspace, date: &TargetDate) -> Self {
        let day = date.iso();
        let location = &space.location;

        Self {
            application_type: "WorkplaceOne".to_string(),
            platform_type: "WEB".to_string(),
            space_type: DESK_SPACE_TYPE,
            reservation_id: String::new(),
            trigger_calendar_event: false,
            mail_data: MailData {
                day_formatted: date.email_label(),
                start_time_formatted: space.open_time.clone(),
                end_time_formatted: space.close_time.clone(),
                location_address: location.address.line1.clone(),
                credits_used: DAY_PASS_CREDITS.to_string(),
                capacity: "1".to_string(),
                timezone_used: format!("GMT {}", location.timezone_offset),
                timezone_iana: location.time_zone_identifier.clone(),
                timezone_win: location.time_zone_win_id.clone(),
                start_date_time: format!("{} 06:00", day),
                end_date_time: format!("{} 23:59", day),
                location_name: location.name.clone(),
                location_city: location.address.city.clone(),
                location_country: location.address.country.clone(),
                location_state: location.address.state.clone(),
            },
            location_type: SHARED_LOCATION_TYPE,
            utc_offset: location.timezone_offset.clone(),
            credit_ratio: CREDIT_RATIO,
            location_id: location.uuid.clone(),
            space_id: space.reservable.kube_id.clone(),
            wework_space_id: space.uuid.clone(),
            start_time: format!("{}T04:00:00Z", day),
            end_time: format!("{}T21:59:00Z", day),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BookingResponse {
    #[serde(rename = "BookingStatus")]
    pub booking_status: String,
    #[serde(rename = "Errors")]
    pub errors: Vec<String>,
    #[serde(rename = "ReservationID")]
    pub reservation_id: String,
    #[serde(rename = "WeWorkUUID")]
    pub wework_uuid: String,
}

impl BookingResponse {
    pub const SUCCESS: &'static str = "BookingSuccess";

    pub fn is_success(&self) -> bool {
        self.booking_status == Self::SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spaces_response_decodes_catalog_payload() {
        let payload = serde_json::json!({
            "limit": 10,
            "offset": 0,
            "getSharedWorkspaces": {
                "workspaces": [{
                    "uuid": "space-1",
                    "reservable": { "capacity": 40, "KubeId": "kube-9", "cwmSpaceId": 17 },
                    "location": {
                        "uuid": "loc-1",
                        "name": "Downtown Hub",
                        "timezoneOffset": "+02:00",
                        "timeZoneIdentifier": "Europe/Berlin",
                        "timeZoneWinId": "W. Europe Standard Time",
                        "address": { "line1": "Main St 1", "city": "Berlin", "country": "DE" }
                    },
                    "openTime": "08:00",
                    "closeTime": "20:00"
                }]
            }
        });

        let response: SpacesResponse = serde_json::from_value(payload).unwrap();
        let space = &response.get_shared_workspaces.workspaces[0];
        assert_eq!(space.id().as_str(), "space-1");
        assert_eq!(space.reservable.kube_id, "kube-9");
        assert_eq!(space.location.time_zone_win_id, "W. Europe Standard Time");
        assert_eq!(space.location.address.city, "Berlin");
    }

    #[test]
    fn test_day_pass_request_fields() {
        let mut space = Workspace {
            uuid: "space-1".into(),
            open_time: "08:00".into(),
            close_time: "20:00".into(),
            ..Default::default()
        };
        space.reservable.kube_id = "kube-9".into();
        space.location.uuid = "loc-1".into();
        space.location.name = "Downtown Hub".into();
        space.location.timezone_offset = "+02:00".into();

        let date = TargetDate::from_ymd(2025, 1, 20).unwrap();
        let request = BookingRequest::day_pass(&space, &date);
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["ApplicationType"], "WorkplaceOne");
        assert_eq!(body["SpaceType"], 4);
        assert_eq!(body["LocationID"], "loc-1");
        assert_eq!(body["SpaceID"], "kube-9");
        assert_eq!(body["WeWorkSpaceID"], "space-1");
        assert_eq!(body["UTCOffset"], "+02:00");
        assert_eq!(body["StartTime"], "2025-01-20T04:00:00Z");
        assert_eq!(body["EndTime"], "2025-01-20T21:59:00Z");
        assert_eq!(body["MailData"]["dayFormatted"], "Monday, January 20th");
        assert_eq!(body["MailData"]["TimezoneUsed"], "GMT +02:00");
        assert_eq!(body["MailData"]["startDateTime"], "2025-01-20 06:00");
    }
}
