//! ---
//! ems_section: "12-gui-dashboard"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Static reference tables rendered alongside live telemetry."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Reference data shown as-is on the analytics, SCADA and system panels.

#[derive(Debug, Clone, Copy)]
pub struct MonthlyEnergy {
    pub month: &'static str,
    pub consumption: u32,
    pub generation: u32,
    pub efficiency: u8,
}

pub const HISTORICAL: [MonthlyEnergy; 6] = [
    MonthlyEnergy {
        month: "Jan",
        consumption: 4200,
        generation: 4500,
        efficiency: 93,
    },
    MonthlyEnergy {
        month: "Feb",
        consumption: 3800,
        generation: 4100,
        efficiency: 95,
    },
    MonthlyEnergy {
        month: "Mar",
        consumption: 4000,
        generation: 4300,
        efficiency: 94,
    },
    MonthlyEnergy {
        month: "Apr",
        consumption: 4500,
        generation: 4800,
        efficiency: 92,
    },
    MonthlyEnergy {
        month: "May",
        consumption: 5000,
        generation: 5300,
        efficiency: 91,
    },
    MonthlyEnergy {
        month: "Jun",
        consumption: 5500,
        generation: 5800,
        efficiency: 90,
    },
];

#[derive(Debug, Clone, Copy)]
pub struct GridCapacity {
    pub name: &'static str,
    pub capacity_mw: u32,
    pub current_mw: u32,
    pub utilization: u8,
}

pub const GRIDS: [GridCapacity; 4] = [
    GridCapacity {
        name: "Grid A",
        capacity_mw: 2500,
        current_mw: 2100,
        utilization: 84,
    },
    GridCapacity {
        name: "Grid B",
        capacity_mw: 3000,
        current_mw: 2700,
        utilization: 90,
    },
    GridCapacity {
        name: "Grid C",
        capacity_mw: 2000,
        current_mw: 1600,
        utilization: 80,
    },
    GridCapacity {
        name: "Grid D",
        capacity_mw: 2800,
        current_mw: 2300,
        utilization: 82,
    },
];

/// Label/value rows for the peak demand card.
pub const PEAK_DEMAND: [(&str, &str); 4] = [
    ("Today Peak", "5,234 MW"),
    ("Weekly Avg", "4,876 MW"),
    ("Monthly High", "5,800 MW"),
    ("Forecast Tomorrow", "5,100 MW"),
];

pub const CARBON: [(&str, &str); 4] = [
    ("CO₂ Avoided", "1,245 tons"),
    ("Renewable %", "34.5%"),
    ("Carbon Intensity", "420 g/kWh"),
    ("Target Progress", "67%"),
];

pub const SUBSTATIONS: [&str; 4] = [
    "Substation A",
    "Substation B",
    "Substation C",
    "Control Center",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplianceStatus {
    Compliant,
    Review,
}

impl ComplianceStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ComplianceStatus::Compliant => "Compliant",
            ComplianceStatus::Review => "Review",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ComplianceItem {
    pub standard: &'static str,
    pub status: ComplianceStatus,
    pub score: u8,
}

pub const NERC_CIP: [ComplianceItem; 6] = [
    ComplianceItem {
        standard: "CIP-002-5.1",
        status: ComplianceStatus::Compliant,
        score: 100,
    },
    ComplianceItem {
        standard: "CIP-003-8",
        status: ComplianceStatus::Compliant,
        score: 100,
    },
    ComplianceItem {
        standard: "CIP-005-6",
        status: ComplianceStatus::Compliant,
        score: 98,
    },
    ComplianceItem {
        standard: "CIP-007-6",
        status: ComplianceStatus::Review,
        score: 95,
    },
    ComplianceItem {
        standard: "CIP-010-3",
        status: ComplianceStatus::Compliant,
        score: 100,
    },
    ComplianceItem {
        standard: "CIP-011-2",
        status: ComplianceStatus::Compliant,
        score: 100,
    },
];

#[derive(Debug, Clone, Copy)]
pub struct Deployment {
    pub environment: &'static str,
    pub version: &'static str,
    pub healthy: bool,
    pub pods: &'static str,
}

impl Deployment {
    pub fn status(&self) -> &'static str {
        if self.healthy {
            "Healthy"
        } else {
            "Updating"
        }
    }
}

pub const DEPLOYMENTS: [Deployment; 3] = [
    Deployment {
        environment: "Production",
        version: "v2.4.1",
        healthy: true,
        pods: "12/12",
    },
    Deployment {
        environment: "Staging",
        version: "v2.5.0-rc1",
        healthy: true,
        pods: "3/3",
    },
    Deployment {
        environment: "Development",
        version: "v2.5.0-dev",
        healthy: false,
        pods: "2/3",
    },
];

#[derive(Debug, Clone, Copy)]
pub struct SecurityScan {
    pub tool: &'static str,
    pub passed: bool,
    pub issues: u32,
    pub last_scan: &'static str,
}

impl SecurityScan {
    pub fn status(&self) -> &'static str {
        if self.passed {
            "Passed"
        } else {
            "Warning"
        }
    }
}

pub const SECURITY_SCANS: [SecurityScan; 4] = [
    SecurityScan {
        tool: "Snyk",
        passed: true,
        issues: 0,
        last_scan: "5 min ago",
    },
    SecurityScan {
        tool: "Trivy",
        passed: true,
        issues: 0,
        last_scan: "10 min ago",
    },
    SecurityScan {
        tool: "Semgrep",
        passed: false,
        issues: 2,
        last_scan: "15 min ago",
    },
    SecurityScan {
        tool: "NERC CIP Check",
        passed: true,
        issues: 0,
        last_scan: "1 hour ago",
    },
];

/// Headline efficiency shown on the dashboard card.
pub const EFFICIENCY_LABEL: &str = "92.5%";
